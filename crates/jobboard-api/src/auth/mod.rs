//! Authentication
//!
//! - Session token issuing and verification
//! - Password hashing with Argon2
//! - Session gate middleware for protected routes
//! - Signup and login

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, TokenError, TokenIssuer, TOKEN_TTL_SECS};
pub use middleware::{auth_middleware, extract_token, AuthError, CurrentUser};
pub use password::{verify_password, verify_password_blocking, PasswordConfig, PasswordError};
pub use service::{session_cookie, AuthService};
