// src/db/settings_repo.rs

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::settings::{
        AppSettings, KEY_ORGANIZATIONS_ENABLED, KEY_PORTAL_DEFAULT_INBOX_ID, KEY_PORTAL_ENABLED,
    },
};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<AppSettings, AppError>;
    async fn save(&self, settings: &AppSettings) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Monta a fotografia a partir das linhas chave/valor (JSONB). Chaves ausentes ficam no padrão.
pub(crate) fn settings_from_rows(rows: &[(String, Value)]) -> AppSettings {
    let mut settings = AppSettings::default();
    for (key, value) in rows {
        match key.as_str() {
            KEY_PORTAL_ENABLED => settings.portal_enabled = value.as_bool().unwrap_or(false),
            // O frontend antigo gravava o id como número de ponto flutuante
            KEY_PORTAL_DEFAULT_INBOX_ID => {
                settings.portal_default_inbox_id = value
                    .as_i64()
                    .or_else(|| value.as_f64().map(|f| f as i64))
                    .unwrap_or(0)
            }
            KEY_ORGANIZATIONS_ENABLED => settings.organizations_enabled = value.as_bool().unwrap_or(false),
            _ => {}
        }
    }
    settings
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn load(&self) -> Result<AppSettings, AppError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"SELECT "key", value FROM settings WHERE "key" LIKE 'app.%'"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(settings_from_rows(&rows))
    }

    async fn save(&self, settings: &AppSettings) -> Result<(), AppError> {
        let entries = [
            (KEY_PORTAL_ENABLED, json!(settings.portal_enabled)),
            (KEY_PORTAL_DEFAULT_INBOX_ID, json!(settings.portal_default_inbox_id)),
            (KEY_ORGANIZATIONS_ENABLED, json!(settings.organizations_enabled)),
        ];

        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO settings ("key", value) VALUES ($1, $2)
                ON CONFLICT ("key") DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_mapped_into_the_snapshot() {
        let rows = vec![
            (KEY_PORTAL_ENABLED.to_string(), json!(true)),
            (KEY_PORTAL_DEFAULT_INBOX_ID.to_string(), json!(3.0)),
            ("app.unrelated".to_string(), json!("x")),
        ];
        let settings = settings_from_rows(&rows);
        assert!(settings.portal_enabled);
        assert_eq!(settings.portal_default_inbox_id, 3);
        assert!(!settings.organizations_enabled);
    }
}
