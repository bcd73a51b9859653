//! Session gate for protected routes
//!
//! Reads the session token from the configured cookie (falling back to an
//! `Authorization: Bearer` header), verifies it, resolves the user it was
//! issued for and attaches that record to the request as [`CurrentUser`].
//! Any failure rejects the request with 401 before the handler runs.

use super::jwt::TokenError;
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use jobboard_core::User;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// The authenticated user for the current request
///
/// Inserted into request extensions by [`auth_middleware`]; handlers take it
/// with `Extension<CurrentUser>` and pass it on to the resource services.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please Login")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] TokenError),

    #[error("User no longer exists")]
    UnknownUser,

    #[error("Invalid password")]
    InvalidPassword,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "UNAUTHORIZED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::UnknownUser => "UNKNOWN_USER",
            AuthError::InvalidPassword => "INVALID_PASSWORD",
        }
    }
}

/// Authentication middleware that requires a valid session token
///
/// ```ignore
/// let jobs = Router::new()
///     .route("/api/jobs", get(list_jobs))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = authenticate(&state, request.headers()).await;
    match outcome {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        Err(err) => {
            if let AppError::Unauthorized(reason) = &err {
                audit_log(&AuditEvent::AccessDenied {
                    path: request.uri().path().to_string(),
                    reason: reason.to_string(),
                    ip_address: extract_ip_address(request.headers()),
                    user_agent: extract_user_agent(request.headers()),
                });
            }
            Err(err)
        }
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token =
        extract_token(headers, &state.config.auth.cookie_name).ok_or(AuthError::MissingToken)?;

    // Signature and expiry are checked before the store is touched
    let user_id = state
        .tokens
        .verify(&token)
        .map_err(AuthError::InvalidToken)?;

    state
        .users
        .find_user(user_id)
        .await?
        .ok_or(AppError::from(AuthError::UnknownUser))
}

/// Find the session token in the named cookie, then in a Bearer header
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}
