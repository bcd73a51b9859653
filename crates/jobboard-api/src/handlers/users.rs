//! User profile handlers
//!
//! These routes are not behind the session gate.

use crate::audit::{audit_log, extract_ip_address, AuditEvent};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::models::{
    MessageResponse, ProfilePatch, UserLookup, UserProfile, UserSelector, UserUpdateRequest,
};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Update a user profile selected by `_id`
#[utoipa::path(
    put,
    path = "/user/update",
    tag = "users",
    request_body(content = UserUpdateRequest, description = "Profile fields plus the `_id` selector"),
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid or disallowed field", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service().update_profile(payload).await?;
    Ok(Json(UserProfile::from(&user)))
}

/// Restricted update selected by `userId`: name, password, age and phone only
#[utoipa::path(
    patch,
    path = "/updateUser",
    tag = "users",
    request_body(content = ProfilePatch, description = "Allowed fields plus the `userId` selector"),
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Disallowed field or weak password", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    )
)]
pub async fn patch_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    state.user_service().patch_profile(payload).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Find users by email
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserLookup),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserProfile>),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    )
)]
pub async fn find_users(
    State(state): State<Arc<AppState>>,
    Query(lookup): Query<UserLookup>,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .user_service()
        .find_by_email(lookup.email.as_deref())
        .await?;
    Ok(Json(users.iter().map(UserProfile::from).collect::<Vec<_>>()))
}

/// List every user
#[utoipa::path(
    get,
    path = "/feed",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<UserProfile>),
    )
)]
pub async fn feed(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let users = state.user_service().feed().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect::<Vec<_>>()))
}

/// Delete the user selected by `userId`, with its job postings
#[utoipa::path(
    delete,
    path = "/delete",
    tag = "users",
    request_body = UserSelector,
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = state.user_service().delete(payload).await?;

    audit_log(&AuditEvent::AccountDeleted {
        user_id,
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
