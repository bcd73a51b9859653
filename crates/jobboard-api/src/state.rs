//! Application state management

use crate::auth::{AuthService, PasswordConfig, TokenError, TokenIssuer};
use crate::services::{JobService, UserService};
use jobboard_core::config::AppConfig;
use jobboard_core::{JobRepository, MemoryStore, UserRepository};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Everything here is fixed at startup and read-only afterwards.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Session token signer, holding the configured secret
    pub tokens: TokenIssuer,
    /// Argon2 cost parameters
    pub passwords: PasswordConfig,
    /// Credential store
    pub users: Arc<dyn UserRepository>,
    /// Job posting store
    pub jobs: Arc<dyn JobRepository>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(&config.auth.jwt_secret)?;

        Ok(Self {
            config,
            tokens,
            passwords: PasswordConfig::default(),
            users,
            jobs,
            start_time: Instant::now(),
        })
    }

    /// State backed by a fresh in-process store
    pub fn in_memory(config: AppConfig) -> Result<Self, TokenError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    pub fn with_password_config(mut self, passwords: PasswordConfig) -> Self {
        self.passwords = passwords;
        self
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.users.as_ref(), &self.tokens, &self.passwords)
    }

    pub fn user_service(&self) -> UserService<'_> {
        UserService::new(self.users.as_ref(), &self.passwords)
    }

    pub fn job_service(&self) -> JobService<'_> {
        JobService::new(self.jobs.as_ref())
    }
}
