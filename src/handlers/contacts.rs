// src/handlers/contacts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermContactsRead, PermContactsWrite, RequirePermission},
    },
    models::{
        contact::{BlockContactPayload, Contact, CreateContactPayload, UpdateContactPayload},
        organization::ContactOrganizationMembership,
        DbId,
    },
};

#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = Contact),
        (status = 400, description = "E-mail inválido ou já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsWrite>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // A caixa de entrada padrão vem das configurações atuais
    let settings = app_state
        .settings_service
        .load()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let contact = app_state
        .contact_service
        .create(&payload, &settings)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = i64, Path, description = "ID do contato")),
    responses((status = 200, description = "Contato", body = Contact)),
    security(("api_jwt" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsRead>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = app_state
        .contact_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contact)))
}

#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    request_body = UpdateContactPayload,
    params(("id" = i64, Path, description = "ID do contato")),
    responses((status = 200, description = "Contato atualizado", body = Contact)),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsWrite>,
    Path(id): Path<DbId>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = app_state
        .contact_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contact)))
}

#[utoipa::path(
    put,
    path = "/api/contacts/{id}/block",
    tag = "Contacts",
    request_body = BlockContactPayload,
    params(("id" = i64, Path, description = "ID do contato")),
    responses((status = 204, description = "Acesso do contato alterado")),
    security(("api_jwt" = []))
)]
pub async fn block_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsWrite>,
    Path(id): Path<DbId>,
    Json(payload): Json<BlockContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .contact_service
        .set_enabled(id, payload.enabled)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/contacts/{id}/send-set-password",
    tag = "Contacts",
    params(("id" = i64, Path, description = "ID do contato")),
    responses(
        (status = 202, description = "Link para definir a senha enviado"),
        (status = 502, description = "Falha no envio do e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_set_password(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsWrite>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .contact_service
        .send_set_password(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    get,
    path = "/api/contacts/{id}/organizations",
    tag = "Contacts",
    params(("id" = i64, Path, description = "ID do contato")),
    responses((status = 200, description = "Organizações do contato", body = [ContactOrganizationMembership])),
    security(("api_jwt" = []))
)]
pub async fn list_memberships(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermContactsRead>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    let memberships = app_state
        .contact_service
        .memberships(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(memberships)))
}
