// src/db/status_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{status::Status, DbId},
};

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, id: DbId) -> Result<Option<Status>, AppError>;
    async fn list(&self) -> Result<Vec<Status>, AppError>;
    async fn create(&self, name: &str) -> Result<Status, AppError>;
    async fn rename(&self, id: DbId, name: &str) -> Result<Option<Status>, AppError>;
    async fn delete(&self, id: DbId) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct StatusRepository {
    pool: PgPool,
}

impl StatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusStore for StatusRepository {
    async fn get(&self, id: DbId) -> Result<Option<Status>, AppError> {
        let status = sqlx::query_as::<_, Status>("SELECT id, created_at, name FROM statuses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status.map(Status::with_default_flag))
    }

    async fn list(&self) -> Result<Vec<Status>, AppError> {
        let statuses = sqlx::query_as::<_, Status>("SELECT id, created_at, name FROM statuses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(statuses.into_iter().map(Status::with_default_flag).collect())
    }

    async fn create(&self, name: &str) -> Result<Status, AppError> {
        let status = sqlx::query_as::<_, Status>(
            "INSERT INTO statuses (name) VALUES ($1) RETURNING id, created_at, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(status.with_default_flag())
    }

    async fn rename(&self, id: DbId, name: &str) -> Result<Option<Status>, AppError> {
        let status = sqlx::query_as::<_, Status>(
            "UPDATE statuses SET name = $2 WHERE id = $1 RETURNING id, created_at, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status.map(Status::with_default_flag))
    }

    async fn delete(&self, id: DbId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
