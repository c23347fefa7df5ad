// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DbId;

pub const KEY_PORTAL_ENABLED: &str = "app.portal_enabled";
pub const KEY_PORTAL_DEFAULT_INBOX_ID: &str = "app.portal_default_inbox_id";
pub const KEY_ORGANIZATIONS_ENABLED: &str = "app.organizations_enabled";

/// Fotografia das configurações da aplicação, lida uma vez por requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub portal_enabled: bool,
    // 0 = não configurada
    pub portal_default_inbox_id: DbId,
    pub organizations_enabled: bool,
}

impl AppSettings {
    pub fn portal_inbox(&self) -> Option<DbId> {
        (self.portal_default_inbox_id > 0).then_some(self.portal_default_inbox_id)
    }

    pub fn apply(mut self, changes: &UpdateSettingsRequest) -> Self {
        if let Some(v) = changes.portal_enabled {
            self.portal_enabled = v;
        }
        if let Some(v) = changes.portal_default_inbox_id {
            self.portal_default_inbox_id = v;
        }
        if let Some(v) = changes.organizations_enabled {
            self.organizations_enabled = v;
        }
        self
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = true)]
    pub portal_enabled: Option<bool>,

    #[schema(example = 1)]
    pub portal_default_inbox_id: Option<DbId>,

    pub organizations_enabled: Option<bool>,
}
