//! Request and response bodies
//!
//! Request bodies arrive as raw JSON objects so that field allow-lists can be
//! checked before deserializing into the typed structs below. Declarative
//! field rules use `validator`; failures are folded into the core
//! [`ValidationError`].

use chrono::{DateTime, Utc};
use jobboard_core::{Gender, Job, Role, User, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Fields accepted by `PUT /user/update` besides the `_id` selector
pub const PROFILE_UPDATE_FIELDS: &[&str] = &["name", "email", "phone", "age", "gender", "role"];

/// Fields accepted by `PATCH /updateUser` besides the `userId` selector
pub const PROFILE_PATCH_FIELDS: &[&str] = &["name", "password", "age", "phone"];

/// Fields a client may set on a job posting
pub const JOB_FIELDS: &[&str] = &["title", "description", "company", "location", "salary"];

/// Deserialize a checked JSON object into a typed request
pub fn parse_payload<T: DeserializeOwned>(payload: Map<String, Value>) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ValidationError::invalid("body", e.to_string()))
}

/// Run the declarative rules of a request, reporting the first failing field
pub fn validate_fields<T: Validate>(request: &T) -> Result<(), ValidationError> {
    let errors = match request.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };

    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.first().cloned()))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.into_iter().next() {
        Some((field, Some(err))) => {
            let message = err
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("failed {} check", err.code));
            Err(ValidationError::invalid(field, message))
        }
        Some((field, None)) => Err(ValidationError::invalid(field, "is invalid")),
        None => Err(ValidationError::invalid("body", errors.to_string())),
    }
}

/// Parse an optional role string against the closed set
pub fn parse_role(role: Option<&str>) -> Result<Option<Role>, ValidationError> {
    role.map(|r| r.trim().parse()).transpose()
}

pub fn parse_gender(gender: Option<&str>) -> Result<Option<Gender>, ValidationError> {
    gender.map(|g| g.trim().parse()).transpose()
}

// ============================================================================
// Auth
// ============================================================================

/// Signup request
///
/// Every field is optional at the wire level so that a missing value is
/// reported as `MISSING_FIELD` rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
    /// `Applicant` (default) or `Recruiter`
    pub role: Option<String>,
    #[validate(range(min = 18, message = "must be at least 18"))]
    pub age: Option<i32>,
    /// `male`, `female` or `others`
    pub gender: Option<String>,
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub phone: Option<String>,
}

/// Login request; `name` is used as the email when `email` is absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

/// Minimal public identity returned at login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "Applicant")]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

impl LoginResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            message: "Login successful".to_string(),
            token,
            user: LoginUser {
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
            },
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// Public projection of a user record; the password hash never leaves the service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "Applicant")]
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "female")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            age: user.age,
            gender: user.gender,
            phone: user.phone.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `PUT /user/update` (the `_id` selector is taken out first)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserUpdateRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub phone: Option<String>,
    #[validate(range(min = 18, message = "must be at least 18"))]
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub role: Option<String>,
}

/// Body of `PATCH /updateUser` (the `userId` selector is taken out first)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProfilePatch {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
    #[validate(range(min = 18, message = "must be at least 18"))]
    pub age: Option<i32>,
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub phone: Option<String>,
}

/// Body of `DELETE /delete`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSelector {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// Query of `GET /users`
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserLookup {
    pub email: Option<String>,
}

// ============================================================================
// Jobs
// ============================================================================

/// Job fields; all five are required on create, any subset on update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct JobPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub salary: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            salary: job.salary,
            owner_id: job.owner_id,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
