//! Input rules applied before any persistence call
//!
//! Field-level constraints are checked in an explicit pass that returns a
//! structured [`ValidationError`] instead of failing half way through a write.

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Validation failures, one variant per rejected-input kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("Password is weak: {0}")]
    WeakPassword(String),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Updating {0} is not allowed")]
    DisallowedField(String),

    #[error("Email already registered")]
    DuplicateEmail,
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::DisallowedField(_) => "DISALLOWED_FIELD",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
        }
    }
}

/// Trim and lower-case an email so lookups and uniqueness are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Return the trimmed value, or `MissingField` when it is absent or blank
pub fn require_field(value: Option<&str>, field: &str) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField(field.to_string())),
    }
}

/// Validate password strength
///
/// A strong password has at least 8 characters with one lowercase letter,
/// one uppercase letter, one digit and one symbol.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let weak = |reason: &str| Err(ValidationError::WeakPassword(reason.to_string()));

    if password.chars().count() < 8 {
        return weak("must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return weak("must contain at least one lowercase letter");
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return weak("must contain at least one uppercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return weak("must contain at least one digit");
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return weak("must contain at least one symbol");
    }

    Ok(())
}

/// Reject a payload carrying any key outside `allowed`
///
/// Keys are checked in sorted order so the reported field is deterministic.
pub fn check_allowed_fields(
    payload: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    let mut keys: Vec<&String> = payload.keys().collect();
    keys.sort();

    match keys.into_iter().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(ValidationError::DisallowedField(key.clone())),
        None => Ok(()),
    }
}

/// Remove an identifier selector (e.g. `userId`) from a payload and parse it
pub fn take_id_field(payload: &mut Map<String, Value>, key: &str) -> Result<Uuid, ValidationError> {
    match payload.remove(key) {
        Some(Value::String(raw)) => Uuid::parse_str(raw.trim())
            .map_err(|_| ValidationError::invalid(key, "must be a valid identifier")),
        Some(Value::Null) | None => Err(ValidationError::MissingField(key.to_string())),
        Some(_) => Err(ValidationError::invalid(key, "must be a string")),
    }
}
