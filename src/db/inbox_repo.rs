// src/db/inbox_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{inbox::Inbox, DbId},
};

#[async_trait]
pub trait InboxStore: Send + Sync {
    async fn get(&self, id: DbId) -> Result<Option<Inbox>, AppError>;
    async fn list(&self) -> Result<Vec<Inbox>, AppError>;
}

#[derive(Clone)]
pub struct InboxRepository {
    pool: PgPool,
}

impl InboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InboxStore for InboxRepository {
    async fn get(&self, id: DbId) -> Result<Option<Inbox>, AppError> {
        let inbox = sqlx::query_as::<_, Inbox>(
            "SELECT id, created_at, name, enabled, csat_enabled, from_address FROM inboxes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(inbox)
    }

    async fn list(&self) -> Result<Vec<Inbox>, AppError> {
        let inboxes = sqlx::query_as::<_, Inbox>(
            "SELECT id, created_at, name, enabled, csat_enabled, from_address FROM inboxes ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(inboxes)
    }
}
