// src/db/team_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{team::Team, DbId},
};

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get(&self, id: DbId) -> Result<Option<Team>, AppError>;
    // Consulta de associação, independente de permissões
    async fn user_belongs_to_team(&self, team_id: DbId, user_id: DbId) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn get(&self, id: DbId) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as::<_, Team>("SELECT id, created_at, name FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    async fn user_belongs_to_team(&self, team_id: DbId, user_id: DbId) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
