//! Signup and login
//!
//! Neither operation is gated: signup creates the account (no token is issued),
//! login checks the password and issues a session token.

use super::jwt::TokenIssuer;
use super::middleware::AuthError;
use super::password::{verify_password_blocking, PasswordConfig};
use crate::error::AppError;
use crate::models::{parse_gender, parse_role, validate_fields, LoginRequest, SignupRequest};
use jobboard_core::validation::{normalize_email, require_field, validate_password_strength};
use jobboard_core::{BoardError, User, UserRepository, ValidationError};

/// Password presence check; unlike other fields the value is not trimmed
fn require_password(password: Option<String>) -> Result<String, ValidationError> {
    password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::MissingField("password".to_string()))
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Authentication service
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    tokens: &'a TokenIssuer,
    passwords: &'a PasswordConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(
        users: &'a dyn UserRepository,
        tokens: &'a TokenIssuer,
        passwords: &'a PasswordConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Register a new user
    ///
    /// Checks run in a fixed order (required fields, password strength, field
    /// rules) and all of them before the password is hashed or anything is
    /// stored.
    pub async fn signup(&self, mut request: SignupRequest) -> Result<User, AppError> {
        let name = require_field(request.name.as_deref(), "name")?;
        let email = normalize_email(&require_field(request.email.as_deref(), "email")?);
        let password = require_password(request.password.take())?;

        validate_password_strength(&password)?;

        request.name = Some(name.clone());
        request.email = Some(email.clone());
        validate_fields(&request)?;

        let role = parse_role(request.role.as_deref())?.unwrap_or_default();
        let gender = parse_gender(request.gender.as_deref())?;

        let password_hash = self.passwords.hash_blocking(password).await?;

        let mut user = User::new(name, email, password_hash, role);
        user.age = request.age;
        user.gender = gender;
        user.phone = request.phone;

        self.users.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String), AppError> {
        let identifier = request
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .or(request.name.as_deref());
        let identifier = normalize_email(&require_field(identifier, "email")?);
        let password = require_password(request.password)?;

        let user = self
            .users
            .find_user_by_email(&identifier)
            .await?
            .ok_or_else(|| BoardError::not_found("Invalid Credentials"))?;

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidPassword.into());
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::debug!(user_id = %user.id, "Session token issued");
        Ok((user, token))
    }
}
