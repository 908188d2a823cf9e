//! Credential verification.

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, instrument};

use super::claims::Principal;
use crate::user::UserRepository;

/// Credential denial reasons.
///
/// `UnknownEmail` and `BadPassword` are typed for logging and tests, but
/// both surface to the client as the same `invalid credentials` response —
/// a login failure never reveals which half of the credential was wrong.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("unknown email")]
    UnknownEmail,

    #[error("password mismatch")]
    BadPassword,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Verifies submitted credentials against stored user records.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Check an identity+secret pair against the stored record.
    ///
    /// Read-only; returns the principal for the stored user on success.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal, CredentialError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            debug!("login rejected: unknown email");
            return Err(CredentialError::UnknownEmail);
        };

        let matches = bcrypt::verify(password, &user.password_hash)
            .context("verifying password against stored hash")?;

        if !matches {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(CredentialError::BadPassword);
        }

        Ok(Principal {
            id: user.id,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::db::Database;
    use crate::user::{CreateUserRequest, UserService};

    async fn seeded_service() -> AuthService {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        let users = UserService::new(repo.clone());
        users
            .create_user(CreateUserRequest {
                email: "chef@example.com".to_string(),
                name: "Head Chef".to_string(),
                password: "kitchen-secret".to_string(),
                role: Some(Role::Supervisor),
            })
            .await
            .unwrap();

        AuthService::new(repo)
    }

    #[tokio::test]
    async fn verify_returns_principal_with_stored_role() {
        let auth = seeded_service().await;

        let principal = auth.verify("chef@example.com", "kitchen-secret").await.unwrap();
        assert_eq!(principal.role, Role::Supervisor);
        assert!(!principal.id.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_denied() {
        let auth = seeded_service().await;

        let err = auth.verify("chef@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, CredentialError::BadPassword), "got {err:?}");
    }

    #[tokio::test]
    async fn unknown_email_is_denied() {
        let auth = seeded_service().await;

        let err = auth.verify("ghost@example.com", "kitchen-secret").await.unwrap_err();
        assert!(matches!(err, CredentialError::UnknownEmail), "got {err:?}");
    }
}
