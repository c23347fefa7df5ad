// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::actor::{Actor, Agent, ContactIdentity},
};

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Valida o JWT e insere o `Actor` atual nos "extensions" da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::InvalidToken)?;
    let actor = app_state.auth_service.validate_token(token).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

// Extrator com o ator da requisição, agente ou contato
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentActor)
            .ok_or(AppError::InvalidToken)
    }
}

// Só agentes (painel)
pub struct AuthenticatedAgent(pub Agent);

impl<S> FromRequestParts<S> for AuthenticatedAgent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(Actor::Agent(agent)) => Ok(AuthenticatedAgent(agent.clone())),
            Some(Actor::Contact(_)) => Err(AppError::PermissionDenied("globals.permissionDenied")),
            None => Err(AppError::InvalidToken),
        }
    }
}

// Só contatos (portal)
pub struct AuthenticatedContact(pub ContactIdentity);

impl<S> FromRequestParts<S> for AuthenticatedContact
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(Actor::Contact(contact)) => Ok(AuthenticatedContact(contact.clone())),
            Some(Actor::Agent(_)) => Err(AppError::PermissionDenied("globals.permissionDenied")),
            None => Err(AppError::InvalidToken),
        }
    }
}
