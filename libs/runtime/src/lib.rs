//! Process-level plumbing shared by the job board binaries: layered
//! configuration, home directory resolution, logging and shutdown signals.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    AppConfig, CliArgs, ConfigError, DatabaseConfig, Environment, LoggingConfig, Section,
    ServerConfig, SessionConfig,
};
