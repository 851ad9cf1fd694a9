use serde::{Deserialize, Serialize};

/// Configuration for the job_board module (`modules.job_board` in the app config).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobBoardConfig {
    /// How many recent jobs the dashboard lists.
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: u32,
    #[serde(default)]
    pub password: PasswordConfig,
}

/// Argon2id cost parameters for newly created password hashes.
/// Existing hashes carry their own parameters and keep verifying after a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for JobBoardConfig {
    fn default() -> Self {
        Self {
            dashboard_limit: default_dashboard_limit(),
            password: PasswordConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_dashboard_limit() -> u32 {
    20
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
