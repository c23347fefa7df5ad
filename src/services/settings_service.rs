// src/services/settings_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{InboxStore, SettingsStore, Stores},
    models::settings::{AppSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    settings: Arc<dyn SettingsStore>,
    inboxes: Arc<dyn InboxStore>,
}

impl SettingsService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            settings: stores.settings.clone(),
            inboxes: stores.inboxes.clone(),
        }
    }

    /// Lê a fotografia atual. Chamado uma vez por requisição do portal.
    pub async fn load(&self) -> Result<AppSettings, AppError> {
        self.settings.load().await
    }

    pub async fn update(&self, changes: &UpdateSettingsRequest) -> Result<AppSettings, AppError> {
        let updated = self.settings.load().await?.apply(changes);

        // Portal ligado exige uma caixa de entrada padrão existente
        if updated.portal_enabled {
            let inbox_id = updated
                .portal_inbox()
                .ok_or(AppError::input("portal.defaultInboxRequired"))?;
            self.inboxes
                .get(inbox_id)
                .await?
                .ok_or(AppError::NotFound("inbox"))?;
        }

        self.settings.save(&updated).await?;
        tracing::info!(?updated, "Configurações atualizadas");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::error::ErrorKind, db::memory::MemoryStore};

    #[tokio::test]
    async fn enabling_portal_without_inbox_is_rejected() {
        let store = MemoryStore::new();
        let service = SettingsService::new(&store.stores());

        let err = service
            .update(&UpdateSettingsRequest {
                portal_enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InputError { key: "portal.defaultInboxRequired", .. }));
        assert!(!service.load().await.unwrap().portal_enabled);
    }

    #[tokio::test]
    async fn unknown_inbox_is_not_found() {
        let store = MemoryStore::new();
        let service = SettingsService::new(&store.stores());
        let err = service
            .update(&UpdateSettingsRequest {
                portal_enabled: Some(true),
                portal_default_inbox_id: Some(999),
                organizations_enabled: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_keys() {
        let store = MemoryStore::new();
        let inbox = store.add_inbox(true, false);
        let service = SettingsService::new(&store.stores());

        service
            .update(&UpdateSettingsRequest {
                portal_enabled: Some(true),
                portal_default_inbox_id: Some(inbox),
                organizations_enabled: None,
            })
            .await
            .unwrap();
        let settings = service
            .update(&UpdateSettingsRequest {
                organizations_enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(settings.portal_enabled);
        assert_eq!(settings.portal_inbox(), Some(inbox));
        assert!(settings.organizations_enabled);
    }
}
