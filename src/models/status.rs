// src/models/status.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::DbId;

// IDs fixos dos quatro status criados na migration (os nomes podem mudar)
pub const STATUS_OPEN: DbId = 1;
pub const STATUS_SNOOZED: DbId = 2;
pub const STATUS_RESOLVED: DbId = 3;
pub const STATUS_CLOSED: DbId = 4;

pub const DEFAULT_STATUS_IDS: [DbId; 4] = [STATUS_OPEN, STATUS_SNOOZED, STATUS_RESOLVED, STATUS_CLOSED];

pub fn is_default_status(id: DbId) -> bool {
    DEFAULT_STATUS_IDS.contains(&id)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    #[schema(example = "Aguardando cliente")]
    pub name: String,

    // Não existe no banco: calculado a partir dos IDs fixos
    #[sqlx(skip)]
    #[serde(default)]
    pub is_default: bool,
}

impl Status {
    pub fn with_default_flag(mut self) -> Self {
        self.is_default = is_default_status(self.id);
        self
    }
}

/// Alvo de uma transição: por ID ou pelo nome exato.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTarget {
    Id(DbId),
    Name(String),
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[schema(example = 3)]
    pub status_id: Option<DbId>,

    #[schema(example = "Resolved")]
    pub status: Option<String>,

    // Duração no formato "2h", "30m", "1h30m"
    #[schema(example = "2h")]
    pub snoozed_until: Option<String>,
}

impl UpdateStatusPayload {
    pub fn target(&self) -> Option<StatusTarget> {
        match (self.status_id, self.status.as_deref()) {
            (Some(id), _) => Some(StatusTarget::Id(id)),
            (None, Some(name)) if !name.is_empty() => Some(StatusTarget::Name(name.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusNamePayload {
    #[validate(length(min = 1, max = 50, message = "O nome deve ter entre 1 e 50 caracteres"))]
    #[schema(example = "Aguardando cliente")]
    pub name: String,
}
