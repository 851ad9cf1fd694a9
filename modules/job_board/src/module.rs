use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use runtime::{AppConfig, SessionConfig};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::api::web::{self, state::cookie_key, CookieSettings, WebState};
use crate::config::JobBoardConfig;
use crate::contract::client::JobBoardApi;
use crate::domain::{
    accounts::AccountService, jobs::JobService, password::Argon2Hasher, sessions::SessionService,
};
use crate::gateways::local::JobBoardLocalClient;
use crate::infra::storage::{
    SqliteJobsRepository, SqliteSessionsRepository, SqliteUsersRepository,
};

/// Name of this module's entry in the `modules` config bag.
pub const MODULE_NAME: &str = "job_board";

/// Wired job board: repositories, services and the web state built on top.
#[derive(Clone)]
pub struct JobBoardModule {
    sessions: Arc<SessionService>,
    jobs: Arc<JobService>,
    web: WebState,
}

impl JobBoardModule {
    /// Build the module from the application config over an already migrated pool.
    pub fn init(app: &AppConfig, pool: SqlitePool) -> anyhow::Result<Self> {
        info!("Initializing job_board module");

        let cfg: JobBoardConfig = app.module_config(MODULE_NAME)?;
        debug!(
            "Loaded job_board config: dashboard_limit={}, argon2 m={} t={} p={}",
            cfg.dashboard_limit,
            cfg.password.memory_kib,
            cfg.password.iterations,
            cfg.password.parallelism
        );

        let session_cfg = app
            .session
            .as_ref()
            .context("session configuration is required")?;

        Self::new(
            pool,
            session_cfg,
            &cfg,
            app.server.environment.is_production(),
        )
    }

    pub fn new(
        pool: SqlitePool,
        session_cfg: &SessionConfig,
        cfg: &JobBoardConfig,
        secure_cookies: bool,
    ) -> anyhow::Result<Self> {
        let hasher = Argon2Hasher::new(&cfg.password)?;

        let accounts = Arc::new(AccountService::new(
            Arc::new(SqliteUsersRepository::new(pool.clone())),
            Arc::new(hasher),
        ));
        let sessions = Arc::new(SessionService::new(
            Arc::new(SqliteSessionsRepository::new(pool.clone())),
            chrono::Duration::days(i64::from(session_cfg.ttl_days)),
        ));
        let jobs = Arc::new(JobService::new(Arc::new(SqliteJobsRepository::new(pool))));

        let web = WebState {
            accounts,
            sessions: sessions.clone(),
            jobs: jobs.clone(),
            cookie: CookieSettings {
                name: session_cfg.cookie_name.clone(),
                secure: secure_cookies,
                max_age_days: i64::from(session_cfg.ttl_days),
            },
            key: cookie_key(&session_cfg.secret),
            dashboard_limit: cfg.dashboard_limit,
        };

        Ok(Self {
            sessions,
            jobs,
            web,
        })
    }

    /// All pages of the job board, ready to be merged into the ingress router.
    pub fn router(&self) -> Router {
        info!("Registering job_board routes");
        web::router(self.web.clone())
    }

    /// Delete session records whose expiry has passed.
    pub async fn purge_expired_sessions(&self) -> anyhow::Result<u64> {
        Ok(self.sessions.purge_expired().await?)
    }

    /// In-process client for job management outside the web UI.
    pub fn jobs_api(&self) -> Arc<dyn JobBoardApi> {
        Arc::new(JobBoardLocalClient::new(self.jobs.clone()))
    }
}
