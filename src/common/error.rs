// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

/// As quatro categorias de erro expostas pelo núcleo de acesso e ciclo de vida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Permission,
    NotFound,
    General,
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // `key` é a chave de tradução; `name` é interpolado em {name}
    #[error("Entrada inválida: {key}")]
    InputError {
        key: &'static str,
        name: Option<String>,
    },

    #[error("Permissão negada: {0}")]
    PermissionDenied(&'static str),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Conta desativada")]
    AccountDisabled,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Falha no envio de e-mail: {0}")]
    MailError(String),

    #[error("Tempo esgotado: {0}")]
    Timeout(&'static str),

    // `anyhow::Error` captura o contexto de qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn input(key: &'static str) -> Self {
        AppError::InputError { key, name: None }
    }

    pub fn input_named(key: &'static str, name: impl Into<String>) -> Self {
        AppError::InputError {
            key,
            name: Some(name.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InputError { .. } => ErrorKind::Input,
            AppError::PermissionDenied(_)
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::AccountDisabled => ErrorKind::Permission,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::DatabaseError(_)
            | AppError::MailError(_)
            | AppError::Timeout(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::General,
        }
    }

    /// Status HTTP derivado da categoria; credenciais e falhas de e-mail têm código próprio.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::MailError(_) | AppError::Timeout(_) => StatusCode::BAD_GATEWAY,
            _ => match self.kind() {
                ErrorKind::Input => StatusCode::BAD_REQUEST,
                ErrorKind::Permission => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::General => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Converte para a resposta HTTP, traduzindo a mensagem para o idioma da requisição.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status,
                    error: i18n.translate(lang, "globals.invalidFields", &[]),
                    details: Some(json!(details)),
                }
            }
            AppError::InputError { key, name } => {
                let args: Vec<(&str, &str)> = name.iter().map(|n| ("name", n.as_str())).collect();
                ApiError::new(status, i18n.translate(lang, key, &args))
            }
            AppError::PermissionDenied(key) => ApiError::new(status, i18n.translate(lang, key, &[])),
            AppError::NotFound(entity) => {
                let term = i18n.term(lang, entity);
                ApiError::new(
                    status,
                    i18n.translate(lang, "globals.notFound", &[("name", term.as_str())]),
                )
            }
            AppError::InvalidCredentials => {
                ApiError::new(status, i18n.translate(lang, "auth.invalidCredentials", &[]))
            }
            AppError::InvalidToken => ApiError::new(status, i18n.translate(lang, "auth.invalidToken", &[])),
            AppError::AccountDisabled => {
                ApiError::new(status, i18n.translate(lang, "user.accountDisabled", &[]))
            }
            AppError::MailError(_) | AppError::Timeout(_) => {
                tracing::error!("Falha em efeito colateral: {}", self);
                ApiError::new(status, i18n.translate(lang, "mail.sendFailed", &[]))
            }
            // O resto (banco, bcrypt, jwt, anyhow) vira 500 e é logado com o detalhe.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(status, i18n.translate(lang, "globals.internalError", &[]))
            }
        }
    }
}

/// Erro já pronto para a resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos middlewares, que não têm acesso ao idioma da requisição
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::new()).into_response()
    }
}
