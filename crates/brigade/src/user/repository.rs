//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{User, UpdateUserRequest};
use crate::auth::Role;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Generate a readable, unique user ID from an email address.
    /// The random suffix guarantees uniqueness without a DB lookup.
    pub fn generate_user_id(email: &str) -> String {
        let local = email.split('@').next().unwrap_or("user");
        let mut base: String = local
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'a'..='z' | '0'..='9' | '_' | '-' => c,
                _ => '-',
            })
            .collect();
        base = base.trim_matches('-').to_string();
        if base.is_empty() {
            base = "user".to_string();
        }
        format!("{}-{}", base, nanoid::nanoid!(4))
    }

    /// Insert a new user row. The password must already be hashed.
    #[instrument(skip(self, password_hash), fields(email = %email))]
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        let id = Self::generate_user_id(email);

        debug!("creating user: {} ({})", email, id);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(role.to_string())
        .execute(&self.pool)
        .await
        .context("inserting user")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after creation"))
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching user")?;

        Ok(user)
    }

    /// Get a user by email (exact match, as stored).
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("fetching user by email")?;

        Ok(user)
    }

    /// List all users.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing users")?;

        Ok(users)
    }

    /// Update a user. Fields not set in the request are left unchanged.
    /// The password, if present, must already be hashed.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: &str, request: UpdateUserRequest) -> Result<User> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found: {}", id))?;

        let mut updates = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(email) = &request.email {
            updates.push("email = ?");
            values.push(email.clone());
        }

        if let Some(name) = &request.name {
            updates.push("name = ?");
            values.push(name.clone());
        }

        if let Some(password_hash) = &request.password {
            updates.push("password_hash = ?");
            values.push(password_hash.clone());
        }

        if let Some(role) = &request.role {
            updates.push("role = ?");
            values.push(role.to_string());
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = datetime('now')");

        let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&sql);
        for value in &values {
            query_builder = query_builder.bind(value);
        }
        query_builder = query_builder.bind(id);

        query_builder
            .execute(&self.pool)
            .await
            .context("updating user")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after update"))
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting user")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("user not found: {}", id));
        }

        Ok(())
    }

    /// Check if an email is available.
    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("checking email availability")?;

        Ok(count.0 == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn test_repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn create_and_fetch_user() {
        let repo = test_repo().await;

        let user = repo
            .create("chef@example.com", "Head Chef", "hashed", Role::Supervisor)
            .await
            .unwrap();
        assert_eq!(user.email, "chef@example.com");
        assert_eq!(user.role, Role::Supervisor);
        assert!(user.id.starts_with("chef-"));

        let by_id = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.id, user.id);

        let by_email = repo.get_by_email("chef@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn email_lookup_is_exact() {
        let repo = test_repo().await;

        repo.create("chef@example.com", "Head Chef", "hashed", Role::Admin)
            .await
            .unwrap();

        // Lookup is case-sensitive as stored
        assert!(repo.get_by_email("CHEF@example.com").await.unwrap().is_none());
        assert!(repo.get_by_email("chef@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_changes_only_requested_fields() {
        let repo = test_repo().await;

        let user = repo
            .create("waiter@example.com", "Waiter", "hashed", Role::Colaborador)
            .await
            .unwrap();

        let updated = repo
            .update(
                &user.id,
                UpdateUserRequest {
                    name: Some("Senior Waiter".to_string()),
                    role: Some(Role::Supervisor),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Senior Waiter");
        assert_eq!(updated.role, Role::Supervisor);
        assert_eq!(updated.email, "waiter@example.com");
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let repo = test_repo().await;

        let user = repo
            .create("temp@example.com", "Temp", "hashed", Role::Colaborador)
            .await
            .unwrap();
        repo.delete(&user.id).await.unwrap();

        assert!(repo.get(&user.id).await.unwrap().is_none());
        assert!(repo.delete(&user.id).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_all_in_creation_order() {
        let repo = test_repo().await;

        for i in 0..3 {
            repo.create(
                &format!("user{i}@example.com"),
                &format!("User {i}"),
                "hashed",
                Role::Colaborador,
            )
            .await
            .unwrap();
        }

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn email_availability() {
        let repo = test_repo().await;

        assert!(repo.is_email_available("new@example.com").await.unwrap());
        repo.create("new@example.com", "New", "hashed", Role::Colaborador)
            .await
            .unwrap();
        assert!(!repo.is_email_available("new@example.com").await.unwrap());
    }

    #[test]
    fn generated_ids_are_slugged_and_unique() {
        let a = UserRepository::generate_user_id("maría.josé@example.com");
        let b = UserRepository::generate_user_id("maría.josé@example.com");
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let fallback = UserRepository::generate_user_id("@example.com");
        assert!(fallback.starts_with("user-"));
    }
}
