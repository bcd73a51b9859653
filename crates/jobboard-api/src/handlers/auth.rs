//! Signup and login handlers

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::session_cookie;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::models::{parse_payload, LoginRequest, LoginResponse, MessageResponse, SignupRequest};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Register a new user account
///
/// The password must have 8+ characters with upper- and lower-case letters, a
/// digit and a symbol. No session token is issued; the client logs in next.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Missing field, weak password, invalid field or duplicate email", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let request: SignupRequest = parse_payload(payload)?;
    let email = request.email.clone();

    match state.auth_service().signup(request).await {
        Ok(user) => {
            audit_log(&AuditEvent::SignupSuccess {
                user_id: user.id,
                email: user.email.clone(),
                role: user.role.to_string(),
                ip_address,
                user_agent,
            });
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User created successfully")),
            ))
        }
        Err(err) => {
            audit_log(&AuditEvent::SignupFailure {
                email,
                reason: err.to_string(),
                ip_address,
                user_agent,
            });
            Err(err)
        }
    }
}

/// Login with email (or name) and password
///
/// On success the session token is returned in the body and set as an
/// HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing identifier or password", body = crate::error::ApiError),
        (status = 401, description = "Invalid password", body = crate::error::ApiError),
        (status = 404, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let request: LoginRequest = parse_payload(payload)?;
    let identifier = request
        .email
        .clone()
        .or_else(|| request.name.clone())
        .unwrap_or_default();

    let (user, token) = match state.auth_service().login(request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            audit_log(&AuditEvent::LoginFailure {
                identifier,
                reason: err.to_string(),
                ip_address,
                user_agent,
            });
            return Err(err);
        }
    };

    audit_log(&AuditEvent::LoginSuccess {
        user_id: user.id,
        email: user.email.clone(),
        ip_address,
        user_agent,
    });

    let auth = &state.config.auth;
    let cookie = session_cookie(
        &auth.cookie_name,
        &token,
        state.tokens.ttl_secs(),
        auth.cookie_secure,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse::new(&user, token)),
    ))
}
