//! In-process store used by tests and `memory://` deployments

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{JobRepository, UserRepository};
use crate::models::{Job, JobChanges, User, UserChanges};
use crate::validation::ValidationError;
use crate::{BoardError, Result};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
}

/// Store backed by hash maps behind a single lock
///
/// Holding users and jobs under one lock keeps the cascade on user deletion
/// atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| BoardError::store("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| BoardError::store("memory store lock poisoned"))
    }
}

fn email_taken(tables: &Tables, email: &str, except: Uuid) -> bool {
    tables
        .users
        .values()
        .any(|u| u.id != except && u.email == email)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.write()?;
        if email_taken(&tables, &user.email, user.id) {
            return Err(ValidationError::DuplicateEmail.into());
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if email_taken(&tables, email, id) {
                return Err(ValidationError::DuplicateEmail.into());
            }
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.apply(changes);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.jobs.retain(|_, job| job.owner_id != id);
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert_job(&self, job: &Job) -> Result<()> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&job.owner_id) {
            return Err(BoardError::store(format!(
                "job owner {} does not exist",
                job.owner_id
            )));
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .read()?
            .jobs
            .values()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| (j.created_at, j.id));
        Ok(jobs)
    }

    async fn find_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Job>> {
        Ok(self
            .read()?
            .jobs
            .get(&id)
            .filter(|j| j.owner_id == owner_id)
            .cloned())
    }

    async fn update_owned_job(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>> {
        let mut tables = self.write()?;
        Ok(tables
            .jobs
            .get_mut(&id)
            .filter(|j| j.owner_id == owner_id)
            .map(|job| {
                job.apply(changes);
                job.clone()
            }))
    }

    async fn delete_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        let owned = tables
            .jobs
            .get(&id)
            .is_some_and(|j| j.owner_id == owner_id);
        if owned {
            tables.jobs.remove(&id);
        }
        Ok(owned)
    }
}
