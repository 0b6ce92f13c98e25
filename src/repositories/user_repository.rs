use crate::error::{AppResult, RepositoryError};
use crate::models::{User, UserRole};
use crate::store::UserDirectory;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for user directory lookups
pub struct UserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = "id, username, display_name, email, role, created_at";

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(user)
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY username",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(users)
    }
}
