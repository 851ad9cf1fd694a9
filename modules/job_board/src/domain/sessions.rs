use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{Session, User};
use crate::domain::error::DomainError;
use crate::domain::repo::SessionsRepository;

const TOKEN_LEN: usize = 32;

/// Expired rows are swept after this many new anonymous sessions.
pub const DEFAULT_PURGE_INTERVAL: u64 = 1000;

/// Session lifecycle: anonymous on first contact, authenticated at login,
/// destroyed at logout. Expired records count as absent.
#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn SessionsRepository>,
    ttl: Duration,
    purge_every: u64,
    started: Arc<AtomicU64>,
}

/// Outcome of the authentication guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
}

/// The only access-control decision in the application.
pub fn require_authenticated(session: Option<&Session>) -> Access {
    match session {
        Some(s) if s.is_authenticated() => Access::Allow,
        _ => Access::RedirectToLogin,
    }
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionsRepository>, ttl: Duration) -> Self {
        Self {
            repo,
            ttl,
            purge_every: DEFAULT_PURGE_INTERVAL,
            started: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_purge_interval(mut self, every: u64) -> Self {
        self.purge_every = every.max(1);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn new_token() -> String {
        nanoid::nanoid!(TOKEN_LEN)
    }

    /// Resolve the session for a client token, starting a fresh anonymous
    /// session when the token is missing, unknown or expired.
    #[instrument(name = "job_board.service.load_or_start", skip_all)]
    pub async fn load_or_start(&self, token: Option<&str>) -> Result<Session, DomainError> {
        if let Some(token) = token {
            if let Some(session) = self.find_live(token).await? {
                return Ok(session);
            }
        }

        let session = Session {
            id: Self::new_token(),
            user_id: None,
            username: None,
            expires_at: Utc::now() + self.ttl,
        };
        self.repo
            .save(&session)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Started anonymous session");

        let started = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        if started % self.purge_every == 0 {
            if let Err(e) = self.purge_expired().await {
                warn!("Periodic session purge failed: {}", e);
            }
        }
        Ok(session)
    }

    /// Look up a session without creating one; expired records are deleted.
    pub async fn find_live(&self, token: &str) -> Result<Option<Session>, DomainError> {
        let found = self
            .repo
            .find(token)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match found {
            Some(s) if s.is_expired_at(Utc::now()) => {
                debug!("Session expired, discarding");
                self.repo
                    .delete(token)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Mark the client as logged in as `user`. The token is rotated: the
    /// previous record is destroyed and an authenticated one is issued.
    #[instrument(
        name = "job_board.service.log_in",
        skip(self, previous_token, user),
        fields(user_id = %user.id)
    )]
    pub async fn log_in(
        &self,
        previous_token: Option<&str>,
        user: &User,
    ) -> Result<Session, DomainError> {
        if let Some(token) = previous_token {
            self.destroy(token).await?;
        }

        let session = Session {
            id: Self::new_token(),
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            expires_at: Utc::now() + self.ttl,
        };
        self.repo
            .save(&session)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("Session authenticated");
        Ok(session)
    }

    /// Destroying an unknown or already destroyed session succeeds.
    #[instrument(name = "job_board.service.destroy_session", skip_all)]
    pub async fn destroy(&self, token: &str) -> Result<(), DomainError> {
        let existed = self
            .repo
            .delete(token)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(existed, "Session destroyed");
        Ok(())
    }

    #[instrument(name = "job_board.service.purge_expired_sessions", skip(self))]
    pub async fn purge_expired(&self) -> Result<u64, DomainError> {
        let purged = self
            .repo
            .delete_expired(Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("Purged {} expired sessions", purged);
        Ok(purged)
    }
}
