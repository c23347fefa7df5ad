// src/db/view_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{view::View, DbId},
};

#[async_trait]
pub trait ViewStore: Send + Sync {
    async fn get(&self, id: DbId) -> Result<Option<View>, AppError>;
}

#[derive(Clone)]
pub struct ViewRepository {
    pool: PgPool,
}

impl ViewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewStore for ViewRepository {
    async fn get(&self, id: DbId) -> Result<Option<View>, AppError> {
        let view = sqlx::query_as::<_, View>(
            r#"
            SELECT id, name, user_id, team_id, visibility, filters, created_at
            FROM views
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(view)
    }
}
