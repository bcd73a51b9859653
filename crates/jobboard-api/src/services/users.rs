//! User profile operations
//!
//! Payload-driven updates take the record selector (`_id` / `userId`) out of
//! the body, check the remaining keys against the route's allow-list, then run
//! the field rules. Nothing reaches the store until all of that passes.

use serde_json::{Map, Value};

use crate::auth::PasswordConfig;
use crate::error::AppError;
use crate::models::{
    parse_gender, parse_payload, parse_role, validate_fields, ProfilePatch, UserUpdateRequest,
    PROFILE_PATCH_FIELDS, PROFILE_UPDATE_FIELDS,
};
use jobboard_core::validation::{
    check_allowed_fields, normalize_email, require_field, take_id_field,
    validate_password_strength,
};
use jobboard_core::{BoardError, User, UserChanges, UserRepository};
use uuid::Uuid;

fn user_not_found() -> BoardError {
    BoardError::not_found("User not found")
}

pub struct UserService<'a> {
    users: &'a dyn UserRepository,
    passwords: &'a PasswordConfig,
}

impl<'a> UserService<'a> {
    pub fn new(users: &'a dyn UserRepository, passwords: &'a PasswordConfig) -> Self {
        Self { users, passwords }
    }

    /// Full profile update keyed by `_id`
    pub async fn update_profile(&self, mut payload: Map<String, Value>) -> Result<User, AppError> {
        let id = take_id_field(&mut payload, "_id")?;
        check_allowed_fields(&payload, PROFILE_UPDATE_FIELDS)?;

        let mut request: UserUpdateRequest = parse_payload(payload)?;
        request.name = request.name.map(|n| n.trim().to_string());
        request.email = request.email.as_deref().map(normalize_email);
        validate_fields(&request)?;

        let changes = UserChanges {
            role: parse_role(request.role.as_deref())?,
            gender: parse_gender(request.gender.as_deref())?,
            name: request.name,
            email: request.email,
            age: request.age,
            phone: request.phone,
            password_hash: None,
        };

        self.apply(id, &changes).await
    }

    /// Restricted update keyed by `userId`; only name, password, age and phone
    pub async fn patch_profile(&self, mut payload: Map<String, Value>) -> Result<User, AppError> {
        let id = take_id_field(&mut payload, "userId")?;
        check_allowed_fields(&payload, PROFILE_PATCH_FIELDS)?;

        let mut request: ProfilePatch = parse_payload(payload)?;
        request.name = request.name.map(|n| n.trim().to_string());
        validate_fields(&request)?;

        let password_hash = match request.password {
            Some(password) => {
                validate_password_strength(&password)?;
                Some(self.passwords.hash_blocking(password).await?)
            }
            None => None,
        };

        let changes = UserChanges {
            name: request.name,
            password_hash,
            age: request.age,
            phone: request.phone,
            ..Default::default()
        };

        self.apply(id, &changes).await
    }

    async fn apply(&self, id: Uuid, changes: &UserChanges) -> Result<User, AppError> {
        let user = self
            .users
            .update_user(id, changes)
            .await?
            .ok_or_else(user_not_found)?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Users registered under `email`; 404 when there are none
    pub async fn find_by_email(&self, email: Option<&str>) -> Result<Vec<User>, AppError> {
        let email = normalize_email(&require_field(email, "email")?);

        match self.users.find_user_by_email(&email).await? {
            Some(user) => Ok(vec![user]),
            None => Err(user_not_found().into()),
        }
    }

    pub async fn feed(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list_users().await?)
    }

    /// Delete the user named by `userId`, together with the jobs it owns
    pub async fn delete(&self, mut payload: Map<String, Value>) -> Result<Uuid, AppError> {
        let id = take_id_field(&mut payload, "userId")?;

        if !self.users.delete_user(id).await? {
            return Err(user_not_found().into());
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(id)
    }
}
