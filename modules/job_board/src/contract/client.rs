use async_trait::async_trait;

use crate::contract::{
    error::JobBoardError,
    model::{Job, NewJob},
};

/// Public API for managing job postings outside the web UI (CLI, other modules)
#[async_trait]
pub trait JobBoardApi: Send + Sync {
    /// Validate and store a new job posting
    async fn add_job(&self, new_job: NewJob) -> Result<Job, JobBoardError>;

    /// Most recent postings, newest first
    async fn recent_jobs(&self, limit: u32) -> Result<Vec<Job>, JobBoardError>;
}
