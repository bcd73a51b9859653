//! API route definitions

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth, jobs, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

/// Create the application routes
///
/// Signup, login and the user routes are public; every job route passes the
/// session gate first.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler))
        .route("/user/update", put(users::update_user))
        .route("/updateUser", patch(users::patch_user))
        .route("/users", get(users::find_users))
        .route("/feed", get(users::feed))
        .route("/delete", delete(users::delete_user));

    let protected_routes = Router::new()
        .route("/api/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
