// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::Stores,
    services::{
        access_guard::AccessGuard,
        assignment_service::AssignmentEngine,
        auth::AuthService,
        contact_service::ContactService,
        conversation_service::ConversationService,
        mailer::{DisabledMailer, Mailer, SmtpMailer},
        notifier::{EventBus, EventNotifier},
        organization_service::OrganizationService,
        settings_service::SettingsService,
        status_service::StatusService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PORTAL_BASE_URL: &str = "http://localhost:3000/portal";
const DEFAULT_SIDE_EFFECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub side_effect_timeout: Duration,
    pub webhook_urls: Vec<String>,
    pub portal_base_url: String,
    // Sem SMTP_HOST os envios falham com MailError
    pub smtp: Option<SmtpConfig>,
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let side_effect_timeout = match optional_var("SIDE_EFFECT_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SIDE_EFFECT_TIMEOUT_SECS inválido: {raw}"))?,
            None => DEFAULT_SIDE_EFFECT_TIMEOUT_SECS,
        };

        let webhook_urls = optional_var("WEBHOOK_URLS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let smtp = match optional_var("SMTP_HOST") {
            Some(host) => {
                let port = match optional_var("SMTP_PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .with_context(|| format!("SMTP_PORT inválida: {raw}"))?,
                    None => DEFAULT_SMTP_PORT,
                };
                Some(SmtpConfig {
                    host,
                    port,
                    from_address: optional_var("SMTP_FROM").context("SMTP_FROM deve ser definido junto com SMTP_HOST")?,
                    user: optional_var("SMTP_USER"),
                    password: optional_var("SMTP_PASSWORD"),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            side_effect_timeout: Duration::from_secs(side_effect_timeout),
            webhook_urls,
            portal_base_url: optional_var("PORTAL_BASE_URL").unwrap_or_else(|| DEFAULT_PORTAL_BASE_URL.to_string()),
            smtp,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub event_bus: EventBus,

    pub auth_service: AuthService,
    pub conversation_service: ConversationService,
    pub status_service: StatusService,
    pub organization_service: OrganizationService,
    pub contact_service: ContactService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp, &config.portal_base_url)?),
            None => {
                tracing::warn!("SMTP_HOST não definido: envios de e-mail vão falhar");
                Arc::new(DisabledMailer)
            }
        };

        let stores = Stores::postgres(db_pool.clone());
        Ok(Self::build(db_pool, &stores, mailer, config))
    }

    // --- Monta o gráfico de dependências ---
    fn build(db_pool: PgPool, stores: &Stores, mailer: Arc<dyn Mailer>, config: &AppConfig) -> Self {
        let event_bus = EventBus::default();
        let notifier: Arc<dyn EventNotifier> = Arc::new(event_bus.clone());

        let auth_service = AuthService::new(
            stores,
            mailer.clone(),
            config.jwt_secret.clone(),
            config.side_effect_timeout,
        );
        let organization_service = OrganizationService::new(stores);
        let status_service = StatusService::new(stores, mailer, notifier.clone(), config.side_effect_timeout);
        let conversation_service = ConversationService::new(
            stores,
            AccessGuard::new(stores),
            AssignmentEngine::new(stores, notifier.clone()),
            status_service.clone(),
            organization_service.clone(),
            notifier,
        );
        let contact_service = ContactService::new(stores, organization_service.clone(), auth_service.clone());

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            event_bus,
            auth_service,
            conversation_service,
            status_service,
            organization_service,
            contact_service,
            settings_service: SettingsService::new(stores),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Estado completo sobre stores em memória. O pool é preguiçoso e nunca conecta.
    pub fn for_tests(stores: &Stores, mailer: Arc<dyn Mailer>) -> Self {
        let config = AppConfig {
            database_url: "postgres://localhost/helpdesk_test".into(),
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            side_effect_timeout: Duration::from_secs(5),
            webhook_urls: vec![],
            portal_base_url: DEFAULT_PORTAL_BASE_URL.into(),
            smtp: None,
        };
        let db_pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("URL de teste inválida");
        Self::build(db_pool, stores, mailer, &config)
    }
}
