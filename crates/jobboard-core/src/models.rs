//! Domain records for users and job postings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// User role
///
/// Closed set of account kinds:
/// - Applicant: looks for jobs (default)
/// - Recruiter: posts jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Applicant,
    Recruiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "Applicant",
            Role::Recruiter => "Recruiter",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applicant" => Ok(Role::Applicant),
            "Recruiter" => Ok(Role::Recruiter),
            other => Err(ValidationError::invalid(
                "role",
                format!("'{other}' is not one of Applicant, Recruiter"),
            )),
        }
    }
}

/// Self-declared gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "others" => Ok(Gender::Others),
            other => Err(ValidationError::invalid(
                "gender",
                format!("'{other}' is not one of male, female, others"),
            )),
        }
    }
}

/// User account record
///
/// The password is only ever held as a PHC hash string. This type is not
/// `Serialize` on purpose; responses go through a public projection.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Normalized (trimmed, lower-cased) and unique
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a fresh identifier
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            age: None,
            gender: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a change set in place, stamping `updated_at`
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(hash) = &changes.password_hash {
            self.password_hash = hash.clone();
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(age) = changes.age {
            self.age = Some(age);
        }
        if let Some(gender) = changes.gender {
            self.gender = Some(gender);
        }
        if let Some(phone) = &changes.phone {
            self.phone = Some(phone.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Validated field changes for a user record; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
}

/// Job posting owned by the user who created it
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: i64,
    /// Stamped from the authenticated identity at creation; never editable
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        owner_id: Uuid,
        title: String,
        description: String,
        company: String,
        location: String,
        salary: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            company,
            location,
            salary,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: &JobChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(company) = &changes.company {
            self.company = company.clone();
        }
        if let Some(location) = &changes.location {
            self.location = location.clone();
        }
        if let Some(salary) = changes.salary {
            self.salary = salary;
        }
        self.updated_at = Utc::now();
    }
}

/// Validated field changes for a job posting; the owner is not part of it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<i64>,
}
