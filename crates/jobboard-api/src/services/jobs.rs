//! Job postings, scoped to the authenticated owner
//!
//! Every call takes the [`CurrentUser`] attached by the session gate. The
//! owner is stamped from it on create and used as a filter everywhere else,
//! so a posting owned by someone else answers exactly like a missing one.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{parse_payload, validate_fields, JobPayload, JOB_FIELDS};
use jobboard_core::validation::{check_allowed_fields, require_field};
use jobboard_core::{BoardError, Job, JobChanges, JobRepository, ValidationError};

fn job_not_found() -> BoardError {
    BoardError::not_found("Job not found")
}

/// Parse a path segment; anything that is not an id matches no job
pub fn parse_job_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| job_not_found().into())
}

fn non_empty(value: Option<String>, field: &str) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::invalid(field, "must not be empty")),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn checked_payload(payload: Map<String, Value>) -> Result<JobPayload, AppError> {
    check_allowed_fields(&payload, JOB_FIELDS)?;
    let request: JobPayload = parse_payload(payload)?;
    validate_fields(&request)?;
    Ok(request)
}

pub struct JobService<'a> {
    jobs: &'a dyn JobRepository,
}

impl<'a> JobService<'a> {
    pub fn new(jobs: &'a dyn JobRepository) -> Self {
        Self { jobs }
    }

    pub async fn create(
        &self,
        owner: &CurrentUser,
        payload: Map<String, Value>,
    ) -> Result<Job, AppError> {
        let request = checked_payload(payload)?;

        let title = require_field(request.title.as_deref(), "title")?;
        let description = require_field(request.description.as_deref(), "description")?;
        let company = require_field(request.company.as_deref(), "company")?;
        let location = require_field(request.location.as_deref(), "location")?;
        let salary = request
            .salary
            .ok_or_else(|| ValidationError::MissingField("salary".to_string()))?;

        let job = Job::new(owner.id(), title, description, company, location, salary);
        self.jobs.insert_job(&job).await?;

        tracing::info!(job_id = %job.id, owner_id = %job.owner_id, "Job created");
        Ok(job)
    }

    pub async fn list(&self, owner: &CurrentUser) -> Result<Vec<Job>, AppError> {
        Ok(self.jobs.list_jobs_by_owner(owner.id()).await?)
    }

    pub async fn get(&self, owner: &CurrentUser, id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .find_owned_job(id, owner.id())
            .await?
            .ok_or_else(|| job_not_found().into())
    }

    /// Partial update; absent fields keep their value
    pub async fn update(
        &self,
        owner: &CurrentUser,
        id: Uuid,
        payload: Map<String, Value>,
    ) -> Result<Job, AppError> {
        let request = checked_payload(payload)?;

        let changes = JobChanges {
            title: non_empty(request.title, "title")?,
            description: non_empty(request.description, "description")?,
            company: non_empty(request.company, "company")?,
            location: non_empty(request.location, "location")?,
            salary: request.salary,
        };

        let job = self
            .jobs
            .update_owned_job(id, owner.id(), &changes)
            .await?
            .ok_or_else(job_not_found)?;

        tracing::info!(job_id = %job.id, "Job updated");
        Ok(job)
    }

    pub async fn delete(&self, owner: &CurrentUser, id: Uuid) -> Result<(), AppError> {
        if !self.jobs.delete_owned_job(id, owner.id()).await? {
            return Err(job_not_found().into());
        }

        tracing::info!(job_id = %id, "Job deleted");
        Ok(())
    }
}
