pub mod accounts;
pub mod error;
pub mod jobs;
pub mod password;
pub mod repo;
pub mod sessions;
