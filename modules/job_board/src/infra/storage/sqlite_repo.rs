//! SQLx/SQLite adapters for the domain repository ports.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::contract::model::{Job, Session, User};
use crate::domain::repo::{InsertUserError, JobsRepository, SessionsRepository, UsersRepository};
use crate::infra::storage::entity::{JobRow, SessionRow, UserRow};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

pub struct SqliteUsersRepository {
    pool: SqlitePool,
}

impl SqliteUsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("find user by {column} failed"))?;
        row.map(User::try_from).transpose()
    }
}

/// Which UNIQUE column a failed insert collided with, from SQLite's message
/// ("UNIQUE constraint failed: users.email").
fn classify_insert_error(err: sqlx::Error) -> InsertUserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.email") {
                return InsertUserError::EmailTaken;
            }
            if message.contains("users.username") {
                return InsertUserError::UsernameTaken;
            }
        }
    }
    InsertUserError::Other(anyhow::Error::new(err).context("insert user failed"))
}

#[async_trait]
impl UsersRepository for SqliteUsersRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.find_one("username", username).await
    }

    async fn insert(&self, u: User) -> Result<(), InsertUserError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(u.id.to_string())
        .bind(&u.username)
        .bind(&u.email)
        .bind(&u.password_hash)
        .bind(u.created_at)
        .execute(&self.pool)
        .await
        .map_err(classify_insert_error)?;
        Ok(())
    }
}

pub struct SqliteJobsRepository {
    pool: SqlitePool,
}

impl SqliteJobsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobsRepository for SqliteJobsRepository {
    async fn insert(&self, j: Job) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO jobs (id, title, description, company, location, salary, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(j.id.to_string())
        .bind(&j.title)
        .bind(&j.description)
        .bind(&j.company)
        .bind(&j.location)
        .bind(j.salary.map(i64::from))
        .bind(j.created_at)
        .execute(&self.pool)
        .await
        .context("insert job failed")?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> anyhow::Result<Vec<Job>> {
        // rowid breaks ties between postings created within the same instant.
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT id, title, description, company, location, salary, created_at \
             FROM jobs ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("list jobs failed")?;
        rows.into_iter().map(Job::try_from).collect()
    }
}

pub struct SqliteSessionsRepository {
    pool: SqlitePool,
}

impl SqliteSessionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionsRepository for SqliteSessionsRepository {
    async fn find(&self, id: &str) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, username, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find session failed")?;
        row.map(Session::try_from).transpose()
    }

    async fn save(&self, s: &Session) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, username, expires_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               user_id = excluded.user_id, \
               username = excluded.username, \
               expires_at = excluded.expires_at",
        )
        .bind(&s.id)
        .bind(s.user_id.map(|id| id.to_string()))
        .bind(&s.username)
        .bind(s.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .context("save session failed")?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete session failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .context("purge expired sessions failed")?;
        Ok(res.rows_affected())
    }
}
