//! Persistence contract for users and job postings
//!
//! Every operation is a single-record (or single-filter) call delegated to the
//! backing store. Ownership scoping is part of the job contract: reads,
//! updates and deletes always filter by both the job id and the owner id, so a
//! job owned by someone else is indistinguishable from a missing one.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Job, JobChanges, User, UserChanges};
use crate::Result;

/// Credential store operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email yields `ValidationError::DuplicateEmail`
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Find a user by id
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Find a user by normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List every user, oldest first
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Apply changes to a user, returning the updated record if it exists
    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>>;

    /// Delete a user (and the jobs it owns); `false` if nothing matched
    async fn delete_user(&self, id: Uuid) -> Result<bool>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Job posting operations, scoped by owner
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job posting
    async fn insert_job(&self, job: &Job) -> Result<()>;

    /// List jobs owned by `owner_id`, oldest first
    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>>;

    /// Find a job matching both `id` and `owner_id`
    async fn find_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Job>>;

    /// Update a job matching both `id` and `owner_id`
    async fn update_owned_job(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>>;

    /// Delete a job matching both `id` and `owner_id`; `false` if nothing matched
    async fn delete_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;
}
