use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Job, NewJob};
use crate::domain::error::DomainError;
use crate::domain::repo::JobsRepository;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_COMPANY_LEN: usize = 100;

/// Job postings: validation on the way in, newest-first listing on the way out.
#[derive(Clone)]
pub struct JobService {
    repo: Arc<dyn JobsRepository>,
}

fn required(
    field: &'static str,
    value: &str,
    max: usize,
    missing: &str,
    too_long: &str,
) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, missing));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(field, too_long));
    }
    Ok(value.to_string())
}

/// Trimmed copy of `new_job`, or the first rule it breaks.
pub fn validate_job(new_job: &NewJob) -> Result<NewJob, DomainError> {
    Ok(NewJob {
        title: required(
            "title",
            &new_job.title,
            MAX_TITLE_LEN,
            "Please add a title",
            "Title can not be more than 100 characters",
        )?,
        description: required(
            "description",
            &new_job.description,
            MAX_DESCRIPTION_LEN,
            "Please add a description",
            "Description can not be more than 1000 characters",
        )?,
        company: required(
            "company",
            &new_job.company,
            MAX_COMPANY_LEN,
            "Please add a company name",
            "Company name can not be more than 100 characters",
        )?,
        location: new_job
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        salary: new_job.salary,
    })
}

impl JobService {
    pub fn new(repo: Arc<dyn JobsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "job_board.service.create_job",
        skip(self, new_job),
        fields(title = %new_job.title)
    )]
    pub async fn create_job(&self, new_job: NewJob) -> Result<Job, DomainError> {
        info!("Creating job posting");

        let valid = validate_job(&new_job)?;
        let job = Job {
            id: Uuid::new_v4(),
            title: valid.title,
            description: valid.description,
            company: valid.company,
            location: valid.location,
            salary: valid.salary,
            created_at: Utc::now(),
        };

        self.repo
            .insert(job.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created job with id={}", job.id);
        Ok(job)
    }

    #[instrument(name = "job_board.service.recent_jobs", skip(self))]
    pub async fn recent_jobs(&self, limit: u32) -> Result<Vec<Job>, DomainError> {
        let jobs = self
            .repo
            .list_recent(limit)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Loaded {} jobs", jobs.len());
        Ok(jobs)
    }
}
