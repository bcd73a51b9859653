//! PostgreSQL store
//!
//! Provides user and job persistence using SQLx and PostgreSQL. The schema is
//! embedded from `migrations/` and applied with [`PgStore::migrate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use super::{JobRepository, UserRepository};
use crate::models::{Gender, Job, JobChanges, Role, User, UserChanges};
use crate::validation::ValidationError;
use crate::{BoardError, Result};

/// PostgreSQL-backed store for users and jobs
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store connection
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| BoardError::store(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BoardError::store(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Map a write failure, surfacing unique-email violations as validation errors
fn write_error(context: &str, err: sqlx::Error) -> BoardError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return ValidationError::DuplicateEmail.into();
        }
    }
    BoardError::store(format!("{context}: {err}"))
}

fn read_error(context: &str, err: sqlx::Error) -> BoardError {
    BoardError::store(format!("{context}: {err}"))
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    age: Option<i32>,
    gender: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt_row(id: Uuid, err: ValidationError) -> BoardError {
    tracing::warn!(user_id = %id, error = %err, "Corrupt user row");
    BoardError::store(format!("Corrupt user row {id}: {err}"))
}

impl TryFrom<UserRow> for User {
    type Error = BoardError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row.role.parse::<Role>().map_err(|e| corrupt_row(row.id, e))?;
        let gender = row
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(|e| corrupt_row(row.id, e))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            age: row.age,
            gender,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Job row from database
#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    description: String,
    company: String,
    location: String,
    salary: i64,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title,
            description: row.description,
            company: row.company,
            location: row.location,
            salary: row.salary,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role,
                age, gender, phone, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.age)
        .bind(user.gender.map(|g| g.as_str()))
        .bind(&user.phone)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to create user", e))?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, role, age, gender, phone, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, role, age, gender, phone, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch user by email", e))?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, role, age, gender, phone, created_at, updated_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("Failed to list users", e))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                age = COALESCE($6, age),
                gender = COALESCE($7, gender),
                phone = COALESCE($8, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, age, gender, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.age)
        .bind(changes.gender.map(|g| g.as_str()))
        .bind(&changes.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| read_error("Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| read_error("Store ping failed", e))?;
        Ok(())
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn insert_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, description, company, location,
                salary, owner_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.salary)
        .bind(job.owner_id)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| read_error("Failed to create job", e))?;

        Ok(())
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, company, location, salary, owner_id, created_at, updated_at
            FROM jobs
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("Failed to list jobs", e))?;

        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn find_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Job>> {
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, company, location, salary, owner_id, created_at, updated_at
            FROM jobs
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch job", e))?;

        Ok(row.map(Job::from))
    }

    async fn update_owned_job(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>> {
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            UPDATE jobs SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                company = COALESCE($5, company),
                location = COALESCE($6, location),
                salary = COALESCE($7, salary),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, title, description, company, location, salary, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.company)
        .bind(&changes.location)
        .bind(changes.salary)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to update job", e))?;

        Ok(row.map(Job::from))
    }

    async fn delete_owned_job(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| read_error("Failed to delete job", e))?;

        Ok(result.rows_affected() > 0)
    }
}
