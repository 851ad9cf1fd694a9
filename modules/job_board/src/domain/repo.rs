use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{Job, Session, User};

/// Why an insert into the credential store was refused.
#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("username already exists")]
    UsernameTaken,
    #[error("email already exists")]
    EmailTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Credential store port. Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Exact match on the stored (lowercased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Insert a fully-formed user. Uniqueness is enforced here as well, so a
    /// lost check-then-insert race still surfaces as a per-field conflict.
    async fn insert(&self, user: User) -> Result<(), InsertUserError>;
}

/// Job store port.
#[async_trait]
pub trait JobsRepository: Send + Sync {
    async fn insert(&self, job: Job) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_recent(&self, limit: u32) -> anyhow::Result<Vec<Job>>;
}

/// Session store port.
#[async_trait]
pub trait SessionsRepository: Send + Sync {
    async fn find(&self, id: &str) -> anyhow::Result<Option<Session>>;
    /// Insert or overwrite by id. Last write wins.
    async fn save(&self, session: &Session) -> anyhow::Result<()>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: &str) -> anyhow::Result<bool>;
    /// Delete every session that expired at or before `now`; returns the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
