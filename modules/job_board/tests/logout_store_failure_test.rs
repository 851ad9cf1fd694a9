//! Logout when the session store refuses the delete.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};

use common::{fast_password_config, login, register, Browser, COOKIE_NAME};
use job_board::api::web::{router, state::cookie_key, CookieSettings, WebState};
use job_board::domain::accounts::AccountService;
use job_board::domain::jobs::JobService;
use job_board::domain::password::Argon2Hasher;
use job_board::domain::repo::SessionsRepository;
use job_board::domain::sessions::SessionService;
use job_board::infra::storage::db::connect_in_memory;
use job_board::infra::storage::{
    SqliteJobsRepository, SqliteSessionsRepository, SqliteUsersRepository,
};
use job_board::model::Session;

/// SQLite session store whose deletes can be switched off.
struct LockableSessions {
    inner: SqliteSessionsRepository,
    locked: AtomicBool,
}

#[async_trait]
impl SessionsRepository for LockableSessions {
    async fn find(&self, id: &str) -> Result<Option<Session>> {
        self.inner.find(id).await
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.inner.save(session).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if self.locked.load(Ordering::SeqCst) {
            bail!("database is locked");
        }
        self.inner.delete(id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.inner.delete_expired(now).await
    }
}

#[tokio::test]
async fn failed_logout_keeps_session_and_reports_error() {
    let pool = connect_in_memory().await.unwrap();
    let sessions_repo = Arc::new(LockableSessions {
        inner: SqliteSessionsRepository::new(pool.clone()),
        locked: AtomicBool::new(false),
    });
    let hasher = Arc::new(Argon2Hasher::new(&fast_password_config()).unwrap());
    let state = WebState {
        accounts: Arc::new(AccountService::new(
            Arc::new(SqliteUsersRepository::new(pool.clone())),
            hasher,
        )),
        sessions: Arc::new(SessionService::new(sessions_repo.clone(), Duration::days(14))),
        jobs: Arc::new(JobService::new(Arc::new(SqliteJobsRepository::new(
            pool.clone(),
        )))),
        cookie: CookieSettings {
            name: COOKIE_NAME.to_string(),
            secure: false,
            max_age_days: 14,
        },
        key: cookie_key("logout-test-secret"),
        dashboard_limit: 10,
    };
    let mut browser = Browser::new(router(state));

    browser.get("/").await;
    register(&mut browser, "ana", "ana@example.com", "secret1").await;
    let page = login(&mut browser, "ana@example.com", "secret1").await;
    assert_eq!(page.location.as_deref(), Some("/dashboard"));
    let cookie = browser.cookie().map(str::to_owned);

    sessions_repo.locked.store(true, Ordering::SeqCst);
    let page = browser.get("/logout").await;
    assert_eq!(page.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(page.location.is_none());
    assert!(page.set_cookie.is_none(), "cookie must be left alone");
    assert!(page.body.contains("Please try again"));
    assert_eq!(browser.cookie().map(str::to_owned), cookie);

    // The session is still live, so the user is still logged in.
    let page = browser.get("/dashboard").await;
    assert_eq!(page.status, StatusCode::OK);

    sessions_repo.locked.store(false, Ordering::SeqCst);
    let page = browser.get("/logout").await;
    assert_eq!(page.status, StatusCode::FOUND);
    assert_eq!(page.location.as_deref(), Some("/"));
    let page = browser.get("/dashboard").await;
    assert_eq!(page.location.as_deref(), Some("/login"));
}
