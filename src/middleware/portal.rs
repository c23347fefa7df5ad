// src/middleware/portal.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::settings::AppSettings};

/// Barra as rotas do portal quando `app.portal_enabled` está desligado.
///
/// A fotografia das configurações lida aqui vale para a requisição inteira.
pub async fn portal_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = app_state.settings_service.load().await?;
    if !settings.portal_enabled {
        tracing::debug!("Requisição ao portal recusada: portal desativado");
        return Err(AppError::PermissionDenied("portal.disabled"));
    }

    request.extensions_mut().insert(settings);
    Ok(next.run(request).await)
}

pub struct PortalSettings(pub AppSettings);

impl<S> FromRequestParts<S> for PortalSettings
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AppSettings>()
            .copied()
            .map(PortalSettings)
            .ok_or(AppError::PermissionDenied("portal.disabled"))
    }
}
