//! Request extractors whose rejections use the API error shape

use axum::extract::{rejection::JsonRejection, FromRequest};
use jobboard_core::ValidationError;

use crate::error::AppError;

/// `axum::Json` with body failures reported as `INVALID_FIELD` on `body`
///
/// Covers unparseable JSON, a body of the wrong JSON type and a missing
/// `Content-Type: application/json`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::invalid("body", rejection.body_text()))
    }
}
