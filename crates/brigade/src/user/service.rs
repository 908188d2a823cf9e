//! User service for business logic.

use thiserror::Error;
use tracing::{info, instrument};

use super::models::{CreateUserRequest, UpdateUserRequest, User};
use super::repository::UserRepository;
use crate::auth::Role;

/// User operation failures.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl UserError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Service for user management operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Create a new user with validation. Passwords are hashed at rest.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        if !is_valid_email(&request.email) {
            return Err(UserError::validation("email", "invalid email format"));
        }
        if request.name.trim().is_empty() {
            return Err(UserError::validation("name", "must not be empty"));
        }
        if request.password.len() < 6 {
            return Err(UserError::validation(
                "password",
                "must be at least 6 characters",
            ));
        }
        if !self.repo.is_email_available(&request.email).await? {
            return Err(UserError::validation(
                "email",
                format!("'{}' is already registered", request.email),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Colaborador);

        let user = self
            .repo
            .create(&request.email, &request.name, &password_hash, role)
            .await?;
        info!(user_id = %user.id, role = %user.role, "created user");

        Ok(user)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<User, UserError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    /// List all users.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.repo.list().await?)
    }

    /// Update a user.
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<User, UserError> {
        // Existence first so callers get NotFound rather than a store error
        self.get_user(id).await?;

        if let Some(email) = &request.email {
            if !is_valid_email(email) {
                return Err(UserError::validation("email", "invalid email format"));
            }
            if let Some(existing) = self.repo.get_by_email(email).await? {
                if existing.id != id {
                    return Err(UserError::validation(
                        "email",
                        format!("'{email}' is already registered"),
                    ));
                }
            }
        }

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(UserError::validation("name", "must not be empty"));
            }
        }

        let mut processed = request;
        if let Some(password) = &processed.password {
            if password.len() < 6 {
                return Err(UserError::validation(
                    "password",
                    "must be at least 6 characters",
                ));
            }
            processed.password = Some(hash_password(password)?);
        }

        let user = self.repo.update(id, processed).await?;
        info!(user_id = %user.id, "updated user");

        Ok(user)
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        self.get_user(id).await?;
        self.repo.delete(id).await?;
        info!(user_id = %id, "deleted user");

        Ok(())
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.')
}

/// Hash a password using bcrypt.
fn hash_password(password: &str) -> anyhow::Result<String> {
    // Lower cost factor keeps debug builds and tests fast
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).map_err(|e| anyhow::anyhow!("hashing password: {e}"))
}
