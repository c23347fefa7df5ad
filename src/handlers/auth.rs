// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedAgent, i18n::Locale},
    models::{
        actor::{Agent, UserType},
        auth::{AuthResponse, ForgotPasswordPayload, LoginPayload, SetPasswordPayload},
    },
};

async fn login_as(
    app_state: &AppState,
    locale: &Locale,
    payload: &LoginPayload,
    user_type: UserType,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password, user_type)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login do painel
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token JWT do agente", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_as(&app_state, &locale, &payload, UserType::Agent).await
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Agente autenticado", body = Agent)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedAgent(agent): AuthenticatedAgent) -> Json<Agent> {
    Json(agent)
}

// --- PORTAL ---

#[utoipa::path(
    post,
    path = "/api/portal/auth/login",
    tag = "Portal",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token JWT do contato", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Portal ou conta desativados")
    )
)]
pub async fn portal_login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_as(&app_state, &locale, &payload, UserType::Contact).await
}

#[utoipa::path(
    post,
    path = "/api/portal/auth/forgot-password",
    tag = "Portal",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 202, description = "Link de redefinição enviado"),
        (status = 400, description = "Nenhuma conta com este e-mail")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .forgot_password(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    post,
    path = "/api/portal/auth/set-password",
    tag = "Portal",
    request_body = SetPasswordPayload,
    responses(
        (status = 204, description = "Senha definida"),
        (status = 401, description = "Token inválido, expirado ou já usado")
    )
)]
pub async fn set_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .set_password(payload.token.trim(), &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
