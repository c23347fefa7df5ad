// src/services/auth.rs

use std::{sync::Arc, time::Duration};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Stores, UserStore},
    models::{
        actor::{Actor, UserType},
        auth::Claims,
        contact::Contact,
    },
    services::mailer::{with_timeout, Mailer},
};

const TOKEN_VALIDITY_DAYS: i64 = 7;
const RESET_TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    jwt_secret: String,
    side_effect_timeout: Duration,
}

/// Hash bcrypt numa thread de bloqueio, fora do runtime async.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

impl AuthService {
    pub fn new(stores: &Stores, mailer: Arc<dyn Mailer>, jwt_secret: String, side_effect_timeout: Duration) -> Self {
        Self {
            users: stores.users.clone(),
            mailer,
            jwt_secret,
            side_effect_timeout,
        }
    }

    /// Login de agente (painel) ou contato (portal).
    pub async fn login(&self, email: &str, password: &str, user_type: UserType) -> Result<String, AppError> {
        let credentials = self
            .users
            .credentials_by_email(email.trim(), user_type)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Conta sem senha definida ainda não pode entrar
        let password_hash = credentials.password_hash.ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !credentials.enabled {
            return Err(AppError::AccountDisabled);
        }

        tracing::info!(user_id = credentials.id, kind = ?user_type, "Login efetuado");
        self.create_token(credentials.id, user_type)
    }

    /// Decodifica o JWT e carrega o ator atual. Contas desativadas são recusadas.
    pub async fn validate_token(&self, token: &str) -> Result<Actor, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        match claims.kind {
            UserType::Agent => {
                let agent = self
                    .users
                    .get_agent(claims.sub)
                    .await?
                    .ok_or(AppError::InvalidToken)?;
                if !agent.enabled {
                    return Err(AppError::AccountDisabled);
                }
                Ok(Actor::Agent(agent))
            }
            UserType::Contact => {
                let contact = self
                    .users
                    .get_contact(claims.sub)
                    .await?
                    .ok_or(AppError::InvalidToken)?;
                if !contact.enabled {
                    return Err(AppError::AccountDisabled);
                }
                Ok(Actor::Contact(contact.identity()))
            }
        }
    }

    // --- SENHA DO PORTAL ---

    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let contact = self
            .users
            .find_contact_by_email(email.trim())
            .await?
            .filter(|c| c.enabled)
            .ok_or(AppError::input("portal.noAccountWithEmail"))?;
        self.send_reset_link(&contact).await
    }

    /// Gera um token de uso único (24h) e envia o link por e-mail.
    pub async fn send_reset_link(&self, contact: &Contact) -> Result<(), AppError> {
        if contact.email.is_none() {
            return Err(AppError::input("contact.noEmailForSetPassword"));
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + chrono::Duration::hours(RESET_TOKEN_VALIDITY_HOURS);
        self.users.save_reset_token(contact.id, &token, expires_at).await?;

        with_timeout(
            self.side_effect_timeout,
            "reset_link",
            self.mailer.send_reset_link(contact, &token),
        )
        .await?;

        tracing::info!(contact_id = contact.id, "Link de definição de senha enviado");
        Ok(())
    }

    pub async fn set_password(&self, token: &str, password: &str) -> Result<(), AppError> {
        let user_id = self
            .users
            .consume_reset_token(token)
            .await?
            .ok_or(AppError::InvalidToken)?;
        let hashed = hash_password(password).await?;
        self.users.set_password(user_id, &hashed).await?;
        tracing::info!(user_id, "Senha definida pelo link");
        Ok(())
    }

    fn create_token(&self, user_id: i64, kind: UserType) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_VALIDITY_DAYS);

        let claims = Claims {
            sub: user_id,
            kind,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::ErrorKind,
        db::memory::MemoryStore,
        services::mailer::testing::{RecordingMailer, SentMail},
    };

    fn service(store: &Arc<MemoryStore>, mailer: Arc<RecordingMailer>) -> AuthService {
        AuthService::new(&store.stores(), mailer, "segredo-de-teste".into(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn agent_login_round_trips_through_token() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        let agent = store.add_agent(&["conversations:read_all"], &[]);
        store.set_password_hash(agent.id, &hash_password("senha-forte").await.unwrap());

        let token = auth.login(&agent.email, "senha-forte", UserType::Agent).await.unwrap();
        let actor = auth.validate_token(&token).await.unwrap();
        assert_eq!(actor.id(), agent.id);
        assert_eq!(actor.user_type(), UserType::Agent);
    }

    #[tokio::test]
    async fn wrong_password_and_wrong_kind_are_rejected() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        let agent = store.add_agent(&[], &[]);
        store.set_password_hash(agent.id, &hash_password("senha-forte").await.unwrap());

        let err = auth.login(&agent.email, "errada", UserType::Agent).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = auth.login(&agent.email, "senha-forte", UserType::Contact).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn disabled_contact_cannot_log_in() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        let contact = store.add_contact("rui@acme.com");
        store.set_password_hash(contact.id, &hash_password("senha-forte").await.unwrap());
        store.stores().users.set_enabled(contact.id, false).await.unwrap();

        let err = auth.login("rui@acme.com", "senha-forte", UserType::Contact).await.unwrap_err();
        assert!(matches!(err, AppError::AccountDisabled));
    }

    #[tokio::test]
    async fn reset_token_is_single_use() {
        let store = MemoryStore::new();
        let mailer = Arc::new(RecordingMailer::default());
        let auth = service(&store, mailer.clone());
        let contact = store.add_contact("rui@acme.com");

        auth.forgot_password("rui@acme.com").await.unwrap();
        let token = store.latest_reset_token(contact.id).unwrap();
        assert_eq!(
            mailer.sent(),
            vec![SentMail::ResetLink {
                contact_id: contact.id,
                token: token.clone(),
            }]
        );

        auth.set_password(&token, "nova-senha-123").await.unwrap();
        assert!(store.password_hash(contact.id).is_some());

        let err = auth.set_password(&token, "outra-senha-123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_reset_token_is_rejected() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        let contact = store.add_contact("rui@acme.com");

        auth.forgot_password("rui@acme.com").await.unwrap();
        let token = store.latest_reset_token(contact.id).unwrap();
        store.expire_reset_tokens();

        assert!(auth.set_password(&token, "nova-senha-123").await.is_err());
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_is_input_error() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        let err = auth.forgot_password("ninguem@acme.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let store = MemoryStore::new();
        let auth = service(&store, Arc::new(RecordingMailer::default()));
        assert!(matches!(auth.validate_token("nao-e-jwt").await, Err(AppError::InvalidToken)));
    }
}
