//! Job posting handlers
//!
//! All routes here sit behind the session gate and act on the caller's own
//! postings only.

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::models::{JobPayload, JobResponse, MessageResponse};
use crate::services::jobs::parse_job_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Create a job posting owned by the caller
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "jobs",
    request_body = JobPayload,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Missing, invalid or disallowed field", body = crate::error::ApiError),
        (status = 401, description = "Not logged in", body = crate::error::ApiError),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_service().create(&current, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

/// List the caller's job postings
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "Caller's jobs", body = Vec<JobResponse>),
        (status = 401, description = "Not logged in", body = crate::error::ApiError),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.job_service().list(&current).await?;
    Ok(Json(
        jobs.into_iter().map(JobResponse::from).collect::<Vec<_>>(),
    ))
}

/// Get one of the caller's job postings
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = JobResponse),
        (status = 401, description = "Not logged in", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_service().get(&current, parse_job_id(&id)?).await?;
    Ok(Json(JobResponse::from(job)))
}

/// Update fields of one of the caller's job postings
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    request_body = JobPayload,
    responses(
        (status = 200, description = "Updated job", body = JobResponse),
        (status = 400, description = "Invalid or disallowed field", body = crate::error::ApiError),
        (status = 401, description = "Not logged in", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let job = state
        .job_service()
        .update(&current, parse_job_id(&id)?, payload)
        .await?;
    Ok(Json(JobResponse::from(job)))
}

/// Delete one of the caller's job postings
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .job_service()
        .delete(&current, parse_job_id(&id)?)
        .await?;
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}
