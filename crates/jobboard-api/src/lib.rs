//! Job board API - REST server
//!
//! Provides signup/login with session tokens, user profile operations and
//! owner-scoped job posting CRUD over HTTP.

pub mod audit;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document for the service
#[derive(OpenApi)]
#[openapi(
    info(title = "Job Board API", description = "Signup, login, user profiles and job postings"),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::auth::signup_handler,
        handlers::auth::login_handler,
        handlers::users::update_user,
        handlers::users::patch_user,
        handlers::users::find_users,
        handlers::users::feed,
        handlers::users::delete_user,
        handlers::jobs::create_job,
        handlers::jobs::list_jobs,
        handlers::jobs::get_job,
        handlers::jobs::update_job,
        handlers::jobs::delete_job,
    ),
    components(schemas(
        error::ApiError,
        models::SignupRequest,
        models::LoginRequest,
        models::LoginResponse,
        models::LoginUser,
        models::UserProfile,
        models::UserUpdateRequest,
        models::ProfilePatch,
        models::UserSelector,
        models::JobPayload,
        models::JobResponse,
        models::MessageResponse,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "auth", description = "Signup and login"),
        (name = "users", description = "User profiles"),
        (name = "jobs", description = "Job postings owned by the caller"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let cors = cors_layer(&server.cors_origins);
    let body_limit = server.max_body_size;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(routes::api_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
}

/// Router over a fresh in-memory store with cheap password hashing
///
/// Returns the state too, so tests can inspect the store directly.
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> (Router, Arc<AppState>) {
    let mut config = jobboard_core::AppConfig::default();
    config.database.url = "memory://".to_string();
    config.auth.jwt_secret = "integration-test-secret-0000".to_string();

    let state = AppState::in_memory(config)
        .map(|s| s.with_password_config(auth::PasswordConfig::light()))
        .expect("test secret is non-empty");
    let state = Arc::new(state);

    (create_router(state.clone()), state)
}
