//! API Integration Tests
//!
//! The router runs in-process over the in-memory store; requests go through
//! `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use jobboard_api::auth::{verify_password, PasswordConfig};
use jobboard_api::state::AppState;
use jobboard_api::{create_router, create_router_for_testing};
use jobboard_core::{
    AppConfig, Job, JobChanges, JobRepository, User, UserChanges, UserRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "Str0ng!Pass";

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

fn with_cookie(mut request: Request<Body>, token: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, format!("token={token}").parse().unwrap());
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, headers, json)
}

async fn signup(app: &Router, name: &str, email: &str) {
    let request = create_json_request(
        "POST",
        "/signup",
        Some(json!({"name": name, "email": email, "password": PASSWORD})),
    );
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
}

async fn login(app: &Router, email: &str) -> String {
    let request = create_json_request(
        "POST",
        "/login",
        Some(json!({"email": email, "password": PASSWORD})),
    );
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_job(app: &Router, token: &str, title: &str) -> Value {
    let request = with_bearer(
        create_json_request(
            "POST",
            "/api/jobs",
            Some(json!({
                "title": title,
                "description": "Build and run the API",
                "company": "Acme",
                "location": "Remote",
                "salary": 90000,
            })),
        ),
        token,
    );
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_router_for_testing();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let (app, _) = create_router_for_testing();

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["store"], true);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (app, _) = create_router_for_testing();

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/signup"].is_object());
    assert!(json["paths"]["/api/jobs/{id}"].is_object());
}

// =============================================================================
// Signup / Login Tests
// =============================================================================

#[tokio::test]
async fn test_signup_weak_password_persists_nothing() {
    let (app, state) = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/signup",
        Some(json!({"name": "Al", "email": "a@b.com", "password": "Weak1"})),
    );
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "WEAK_PASSWORD");
    assert!(state.users.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_missing_field() {
    let (app, _) = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/signup",
        Some(json!({"name": "Alice", "password": PASSWORD})),
    );
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_FIELD");
    assert_eq!(json["message"], "email is required");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;

    let request = create_json_request(
        "POST",
        "/signup",
        Some(json!({"name": "Alice Again", "email": "ALICE@example.com", "password": PASSWORD})),
    );
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_stored_password_is_hashed() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;

    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    assert_ne!(user.password_hash, PASSWORD);
    assert!(verify_password(PASSWORD, &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_login_sets_cookie_and_unlocks_jobs() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;

    let request = create_json_request(
        "POST",
        "/login",
        Some(json!({"email": "alice@example.com", "password": PASSWORD})),
    );
    let (status, headers, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["name"], "Alice");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["role"], "Applicant");
    let token = json["token"].as_str().unwrap();

    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("token={token}")));
    assert!(cookie.contains("HttpOnly"));

    // Cookie transport
    let request = with_cookie(create_json_request("GET", "/api/jobs", None), token);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));

    // Bearer transport
    let request = with_bearer(create_json_request("GET", "/api/jobs", None), token);
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_name_as_identifier() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;

    let request = create_json_request(
        "POST",
        "/login",
        Some(json!({"name": "alice@example.com", "password": PASSWORD})),
    );
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;

    let request = create_json_request(
        "POST",
        "/login",
        Some(json!({"email": "alice@example.com", "password": "Wr0ng!Pass"})),
    );
    let (status, headers, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid password");
    assert!(headers.get(header::SET_COOKIE).is_none());

    let request = create_json_request(
        "POST",
        "/login",
        Some(json!({"email": "nobody@example.com", "password": PASSWORD})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Invalid Credentials");

    let request = create_json_request("POST", "/login", Some(json!({"email": "alice@example.com"})));
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_FIELD");
}

// =============================================================================
// Session Gate Tests
// =============================================================================

/// Store that fails the test if the gate lets a request reach it
struct UnreachableStore;

#[async_trait]
impl UserRepository for UnreachableStore {
    async fn insert_user(&self, _: &User) -> jobboard_core::Result<()> {
        panic!("store reached")
    }
    async fn find_user(&self, _: Uuid) -> jobboard_core::Result<Option<User>> {
        panic!("store reached")
    }
    async fn find_user_by_email(&self, _: &str) -> jobboard_core::Result<Option<User>> {
        panic!("store reached")
    }
    async fn list_users(&self) -> jobboard_core::Result<Vec<User>> {
        panic!("store reached")
    }
    async fn update_user(&self, _: Uuid, _: &UserChanges) -> jobboard_core::Result<Option<User>> {
        panic!("store reached")
    }
    async fn delete_user(&self, _: Uuid) -> jobboard_core::Result<bool> {
        panic!("store reached")
    }
    async fn ping(&self) -> jobboard_core::Result<()> {
        panic!("store reached")
    }
}

#[async_trait]
impl JobRepository for UnreachableStore {
    async fn insert_job(&self, _: &Job) -> jobboard_core::Result<()> {
        panic!("store reached")
    }
    async fn list_jobs_by_owner(&self, _: Uuid) -> jobboard_core::Result<Vec<Job>> {
        panic!("store reached")
    }
    async fn find_owned_job(&self, _: Uuid, _: Uuid) -> jobboard_core::Result<Option<Job>> {
        panic!("store reached")
    }
    async fn update_owned_job(
        &self,
        _: Uuid,
        _: Uuid,
        _: &JobChanges,
    ) -> jobboard_core::Result<Option<Job>> {
        panic!("store reached")
    }
    async fn delete_owned_job(&self, _: Uuid, _: Uuid) -> jobboard_core::Result<bool> {
        panic!("store reached")
    }
}

fn unreachable_store_app() -> Router {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret-0000".to_string();
    let store = Arc::new(UnreachableStore);
    let state = AppState::new(config, store.clone(), store)
        .unwrap()
        .with_password_config(PasswordConfig::light());
    create_router(Arc::new(state))
}

fn job_route_requests() -> Vec<Request<Body>> {
    let id = Uuid::new_v4();
    let body = json!({"title": "x", "description": "x", "company": "x", "location": "x", "salary": 1});
    vec![
        create_json_request("GET", "/api/jobs", None),
        create_json_request("POST", "/api/jobs", Some(body.clone())),
        create_json_request("GET", &format!("/api/jobs/{id}"), None),
        create_json_request("PUT", &format!("/api/jobs/{id}"), Some(body)),
        create_json_request("DELETE", &format!("/api/jobs/{id}"), None),
    ]
}

#[tokio::test]
async fn test_job_routes_reject_missing_token_before_store() {
    let app = unreachable_store_app();

    for request in job_route_requests() {
        let (status, headers, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Please Login");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    }
}

#[tokio::test]
async fn test_job_routes_reject_bad_token_before_store() {
    let app = unreachable_store_app();

    for request in job_route_requests() {
        let request = with_bearer(request, "not.a.token");
        let (status, _, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "INVALID_TOKEN");
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let fresh = state.tokens.issue_at(user.id, now).unwrap();
    let expired = state.tokens.issue_at(user.id, now - 7200).unwrap();

    let request = with_bearer(create_json_request("GET", "/api/jobs", None), &fresh);
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    let request = with_bearer(create_json_request("GET", "/api/jobs", None), &expired);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_of_deleted_user_rejected() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request("DELETE", "/delete", Some(json!({"userId": user.id})));
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    let request = with_bearer(create_json_request("GET", "/api/jobs", None), &token);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNKNOWN_USER");
}

// =============================================================================
// Job Ownership Tests
// =============================================================================

#[tokio::test]
async fn test_job_crud_for_owner() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let job = create_job(&app, &token, "Backend Engineer").await;
    let id = job["id"].as_str().unwrap().to_string();
    assert_eq!(job["salary"], 90000);

    let request = with_bearer(
        create_json_request("PUT", &format!("/api/jobs/{id}"), Some(json!({"salary": 95000}))),
        &token,
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["salary"], 95000);
    assert_eq!(json["title"], "Backend Engineer");

    let request = with_bearer(create_json_request("GET", "/api/jobs", None), &token);
    let (_, _, json) = send(&app, request).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let request = with_bearer(
        create_json_request("DELETE", &format!("/api/jobs/{id}"), None),
        &token,
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Job deleted successfully");

    let request = with_bearer(create_json_request("GET", &format!("/api/jobs/{id}"), None), &token);
    assert_eq!(send(&app, request).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_owner_gets_not_found() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    signup(&app, "Bobby", "bob@example.com").await;
    let alice = login(&app, "alice@example.com").await;
    let bob = login(&app, "bob@example.com").await;

    let job = create_job(&app, &alice, "Backend Engineer").await;
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    let request = with_bearer(create_json_request("GET", &uri, None), &bob);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let request = with_bearer(
        create_json_request("PUT", &uri, Some(json!({"title": "Taken over"}))),
        &bob,
    );
    assert_eq!(send(&app, request).await.0, StatusCode::NOT_FOUND);

    let request = with_bearer(create_json_request("DELETE", &uri, None), &bob);
    assert_eq!(send(&app, request).await.0, StatusCode::NOT_FOUND);

    let request = with_bearer(create_json_request("GET", "/api/jobs", None), &bob);
    let (_, _, json) = send(&app, request).await;
    assert_eq!(json, json!([]));

    let request = with_bearer(create_json_request("GET", &uri, None), &alice);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Backend Engineer");
}

#[tokio::test]
async fn test_job_owner_not_client_supplied() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let request = with_bearer(
        create_json_request(
            "POST",
            "/api/jobs",
            Some(json!({
                "title": "Engineer",
                "description": "Build",
                "company": "Acme",
                "location": "Remote",
                "salary": 1,
                "owner_id": Uuid::new_v4(),
            })),
        ),
        &token,
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DISALLOWED_FIELD");
}

// =============================================================================
// User Route Tests
// =============================================================================

#[tokio::test]
async fn test_restricted_update_rejects_role() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let before = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request(
        "PATCH",
        "/updateUser",
        Some(json!({"userId": before.id, "name": "Mallory", "role": "Recruiter"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DISALLOWED_FIELD");

    let after = state.users.find_user(before.id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_restricted_update_allowed_fields() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request(
        "PATCH",
        "/updateUser",
        Some(json!({"userId": user.id, "age": 29, "phone": "5551234567"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User updated successfully");

    let updated = state.users.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(updated.age, Some(29));
    assert_eq!(updated.phone.as_deref(), Some("5551234567"));
}

#[tokio::test]
async fn test_profile_update_and_lookup() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request(
        "PUT",
        "/user/update",
        Some(json!({"_id": user.id, "gender": "female", "role": "Recruiter"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["gender"], "female");
    assert_eq!(json["role"], "Recruiter");
    assert!(json.get("password_hash").is_none());

    let request = create_json_request("GET", "/users?email=alice@example.com", None);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], user.id.to_string());

    let request = create_json_request("GET", "/users?email=ghost@example.com", None);
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_feed_hides_password_hashes() {
    let (app, _) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    signup(&app, "Bobby", "bob@example.com").await;

    let request = create_json_request("GET", "/feed", None);
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert!(!json.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_delete_user_cascades_jobs() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;
    create_job(&app, &token, "Backend Engineer").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request("DELETE", "/delete", Some(json!({"userId": user.id})));
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User deleted successfully");
    assert!(state.jobs.list_jobs_by_owner(user.id).await.unwrap().is_empty());

    let request = create_json_request("DELETE", "/delete", Some(json!({"userId": user.id})));
    assert_eq!(send(&app, request).await.0, StatusCode::NOT_FOUND);
}

// =============================================================================
// Request Body Tests
// =============================================================================

#[tokio::test]
async fn test_unreadable_bodies_use_error_shape() {
    let (app, state) = create_router_for_testing();

    let cases = [
        ("application/json", "{not json"),
        ("application/json", "[]"),
        ("text/plain", r#"{"name":"Alice"}"#),
    ];

    for (content_type, body) in cases {
        let request = Request::builder()
            .method("POST")
            .uri("/signup")
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, headers, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(json["code"], "INVALID_FIELD");
    }

    assert!(state.users.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_update_rejects_unknown_role() {
    let (app, state) = create_router_for_testing();
    signup(&app, "Alice", "alice@example.com").await;
    let user = state
        .users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let request = create_json_request(
        "PUT",
        "/user/update",
        Some(json!({"_id": user.id, "role": "Admin"})),
    );
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_FIELD");
    let stored = state.users.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored, user);
}
