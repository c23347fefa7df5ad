// src/models/inbox.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::DbId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inbox {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    #[schema(example = "Suporte")]
    pub name: String,
    pub enabled: bool,
    // Envia pesquisa de satisfação quando a conversa é resolvida
    pub csat_enabled: bool,
    #[schema(example = "suporte@helpdesk.test")]
    pub from_address: Option<String>,
}
