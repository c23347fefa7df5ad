// src/services/mailer.rs

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials as SmtpCredentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    common::error::AppError,
    config::SmtpConfig,
    models::{contact::Contact, conversation::Conversation},
};

/// Colaborador de e-mail. Os envios podem falhar e a falha sobe para o chamador.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_survey(&self, conversation: &Conversation, recipient: &str) -> Result<(), AppError>;
    async fn send_reset_link(&self, contact: &Contact, token: &str) -> Result<(), AppError>;
}

/// Limita o tempo de um efeito colateral. Estourar o limite é um erro geral.
pub async fn with_timeout<T, F>(limit: Duration, what: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AppError::Timeout(what))?
}

fn mail_error(e: impl std::fmt::Display) -> AppError {
    AppError::MailError(e.to_string())
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    portal_base_url: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, portal_base_url: &str) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(mail_error)?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(SmtpCredentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
            portal_base_url: portal_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, to: &str, subject: String, body: String) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from_address.parse().map_err(mail_error)?)
            .to(to.parse().map_err(mail_error)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(mail_error)?;

        self.transport.send(email).await.map_err(mail_error)?;
        tracing::info!(to, "E-mail enviado");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_survey(&self, conversation: &Conversation, recipient: &str) -> Result<(), AppError> {
        let link = format!("{}/csat/{}", self.portal_base_url, conversation.uuid);
        let body = format!(
            "Your conversation has been resolved.\n\nHow did we do? Rate your experience: {}\n",
            link
        );
        self.send(recipient, "How did we do?".to_string(), body).await
    }

    async fn send_reset_link(&self, contact: &Contact, token: &str) -> Result<(), AppError> {
        let email = contact
            .email
            .as_deref()
            .ok_or(AppError::input("contact.noEmailForSetPassword"))?;
        let link = format!("{}/set-password?token={}", self.portal_base_url, token);
        let body = format!(
            "Hello {},\n\nUse the link below to set your password. It is valid for 24 hours.\n\n{}\n",
            contact.first_name, link
        );
        self.send(email, "Set your password".to_string(), body).await
    }
}

/// Usado quando o SMTP não está configurado: todo envio falha.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send_survey(&self, _conversation: &Conversation, _recipient: &str) -> Result<(), AppError> {
        Err(AppError::MailError("SMTP não configurado".into()))
    }

    async fn send_reset_link(&self, _contact: &Contact, _token: &str) -> Result<(), AppError> {
        Err(AppError::MailError("SMTP não configurado".into()))
    }
}
