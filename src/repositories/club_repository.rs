use crate::error::{AppResult, RepositoryError};
use crate::models::Club;
use crate::store::ClubDirectory;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for club lookups
pub struct ClubRepository {
    pool: PgPool,
}

impl ClubRepository {
    /// Create a new ClubRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clubs, alphabetical
    pub async fn list(&self) -> AppResult<Vec<Club>> {
        let clubs = sqlx::query_as::<_, Club>("SELECT id, name FROM clubs ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(clubs)
    }
}

#[async_trait]
impl ClubDirectory for ClubRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Club>> {
        let club = sqlx::query_as::<_, Club>("SELECT id, name FROM clubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(club)
    }
}
