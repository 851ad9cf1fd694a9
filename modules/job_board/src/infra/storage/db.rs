use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use runtime::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

pub use sqlx::sqlite::SqlitePool;

const DEFAULT_MAX_CONNS: u32 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Expand a sqlite URL into an absolute-path URL using a base directory.
/// - Keeps in-memory URLs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
pub fn absolutize_sqlite_url(url: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_url(url) {
        return Ok(url.to_string());
    }
    let db_path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| anyhow!("Database URL must start with sqlite:// (got: {})", url))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        bail!("Empty SQLite path in database URL");
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Open the connection pool. Relative file paths resolve against `home_dir`.
pub async fn connect(cfg: &DatabaseConfig, home_dir: &Path) -> Result<SqlitePool> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    let url = absolutize_sqlite_url(raw, home_dir, true)?;
    let in_memory = is_memory_url(&url);

    let mut opts = SqliteConnectOptions::from_str(&url)
        .with_context(|| format!("Invalid database URL '{}'", url))?
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(
            cfg.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS).into(),
        ));
    if !in_memory {
        opts = opts
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
    }

    let pool = if in_memory {
        single_connection_pool()
    } else {
        SqlitePoolOptions::new()
            .max_connections(cfg.max_conns.unwrap_or(DEFAULT_MAX_CONNS).max(1))
            .acquire_timeout(Duration::from_secs(5))
    }
    .connect_with(opts)
    .await
    .with_context(|| format!("Failed to connect to database '{}'", url))?;

    info!("Connected to database: {}", url);
    Ok(pool)
}

/// Every connection to `:memory:` is its own database, so keep exactly one alive.
fn single_connection_pool() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

/// Fresh, migrated in-memory database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = single_connection_pool().connect_with(opts).await?;
    migrate(&pool).await?;
    Ok(pool)
}
