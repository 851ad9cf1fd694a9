use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Subdirectory under the platform home used when `server.home_dir` is empty.
pub const DEFAULT_HOME_SUBDIR: &str = ".job_board";

/// Placeholder written instead of secrets when the config is printed.
const REDACTED: &str = "<redacted>";

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Core server configuration.
    pub server: ServerConfig,
    /// Database configuration. Required by `validate`.
    pub database: Option<DatabaseConfig>,
    /// Session cookie configuration. Required by `validate`.
    pub session: Option<SessionConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // will be normalized to absolute path
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Deployment environment. Production turns on `Secure` session cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database connection URL (e.g., "sqlite://job_board.db").
    pub url: String,
    /// Maximum number of connections in the pool (optional, defaults to 10).
    pub max_conns: Option<u32>,
    /// SQLite busy timeout in milliseconds (optional, defaults to 5000).
    pub busy_timeout_ms: Option<u32>,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Secret the session cookie is signed with.
    pub secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Lifetime of an idle session, refreshed on every save.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &REDACTED)
            .field("cookie_name", &self.cookie_name)
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

fn default_cookie_name() -> String {
    "job_board.sid".to_string()
}

fn default_ttl_days() -> u32 {
    14
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/job-board.log", empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Reasons a loaded configuration cannot be used to start the server.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("database.url is not configured (set it in the config file or DATABASE_URL)")]
    MissingDatabaseUrl,
    #[error("session.secret is not configured (set it in the config file or SESSION_SECRET)")]
    MissingSessionSecret,
    #[error("session.ttl_days must be greater than zero")]
    InvalidSessionTtl,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => <user home>/.job_board, resolved by resolve_home_dir()
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 10000,
            environment: Environment::Development,
            timeout_sec: 0,
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/job-board.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig {
                url: "sqlite://database/job_board.db".to_string(),
                max_conns: Some(10),
                busy_timeout_ms: Some(5000),
            }),
            session: None,
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        Self::extract(Self::unset(), Some(config_path))
    }

    /// Load configuration from file, or from built-in defaults plus environment variables.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let base = AppConfig {
                    logging: Some(default_logging_config()),
                    ..Self::unset()
                };
                Self::extract(base, None)
            }
        }
    }

    /// Base layer for loading: optional sections stay None unless the YAML file
    /// or the environment provides them, so `validate` sees what is missing.
    fn unset() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            database: None,
            session: None,
            logging: None,
            modules: HashMap::new(),
        }
    }

    fn extract(base: AppConfig, config_path: Option<&Path>) -> Result<Self> {
        use figment::{
            providers::{Format, Serialized, Yaml},
            Figment,
        };

        let mut figment = Figment::new().merge(Serialized::defaults(base));
        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }
        let figment = figment
            .merge(well_known_env())
            // Example: APP__SERVER__PORT=8087 maps to server.port
            .merge(figment::providers::Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .context("Failed to extract config from figment")?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        Ok(config)
    }

    /// Check that everything needed to serve requests is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.database {
            Some(db) if !db.url.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingDatabaseUrl),
        }
        match &self.session {
            Some(s) if s.secret.trim().is_empty() => Err(ConfigError::MissingSessionSecret),
            Some(s) if s.ttl_days == 0 => Err(ConfigError::InvalidSessionTtl),
            Some(_) => Ok(()),
            None => Err(ConfigError::MissingSessionSecret),
        }
    }

    /// Serialize configuration to YAML with secrets masked.
    pub fn to_yaml(&self) -> Result<String> {
        let mut printable = self.clone();
        if let Some(session) = printable.session.as_mut() {
            session.secret = REDACTED.to_string();
        }
        serde_yaml::to_string(&printable).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }

    /// Typed view of one entry of the `modules` bag, or the type's defaults when absent.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid configuration for module '{name}'")),
            None => Ok(T::default()),
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Conventional unprefixed variables that hosting platforms set directly.
fn well_known_env() -> figment::providers::Env {
    figment::providers::Env::raw()
        .only(&["DATABASE_URL", "SESSION_SECRET", "PORT", "APP_ENV"])
        .map(|key| {
            let target = match key.as_str().to_ascii_uppercase().as_str() {
                "DATABASE_URL" => "database.url",
                "SESSION_SECRET" => "session.secret",
                "PORT" => "server.port",
                _ => "server.environment",
            };
            target.into()
        })
}

/// Normalize `server.home_dir` using `resolve_home_dir` and store the absolute path back.
fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    // Treat empty string as "not provided" => None.
    let opt = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved: PathBuf = resolve_home_dir(opt, DEFAULT_HOME_SUBDIR, /*create*/ true)
        .context("home_dir normalization failed")?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
