use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::JobBoardApi,
    error::JobBoardError,
    model::{Job, NewJob},
};
use crate::domain::jobs::JobService;

/// Local implementation of the JobBoardApi trait that delegates to the domain service
pub struct JobBoardLocalClient {
    jobs: Arc<JobService>,
}

impl JobBoardLocalClient {
    pub fn new(jobs: Arc<JobService>) -> Self {
        Self { jobs }
    }
}

#[async_trait]
impl JobBoardApi for JobBoardLocalClient {
    async fn add_job(&self, new_job: NewJob) -> Result<Job, JobBoardError> {
        self.jobs.create_job(new_job).await.map_err(Into::into)
    }

    async fn recent_jobs(&self, limit: u32) -> Result<Vec<Job>, JobBoardError> {
        self.jobs.recent_jobs(limit).await.map_err(Into::into)
    }
}
