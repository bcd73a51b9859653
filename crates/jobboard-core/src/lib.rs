//! Job board core - domain records, rules, and shared types
//!
//! This crate defines the pieces shared by every surface of the job board:
//! - User and job records plus the change sets applied by updates
//! - The validation rules that run before anything is persisted
//! - Common error types
//! - The persistence contract and its PostgreSQL / in-memory stores
//! - Configuration management

pub mod config;
pub mod models;
pub mod store;
pub mod validation;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use models::{Gender, Job, JobChanges, Role, User, UserChanges};
pub use store::{JobRepository, MemoryStore, PgStore, UserRepository};
pub use validation::ValidationError;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for job board operations
#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl BoardError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
