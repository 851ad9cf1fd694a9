pub mod db;
pub mod entity;
pub mod mapper;
pub mod sqlite_repo;

pub use sqlite_repo::{SqliteJobsRepository, SqliteSessionsRepository, SqliteUsersRepository};
