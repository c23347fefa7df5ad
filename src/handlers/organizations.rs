// src/handlers/organizations.rs

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
        rbac::{PermOrganizationsManage, RequirePermission},
    },
    models::{
        organization::{
            AddMemberPayload, DomainPayload, Organization, OrganizationDomain, OrganizationMember,
            OrganizationPayload, UpdateMemberSharePayload,
        },
        DbId,
    },
};

// ---
// ORGANIZAÇÕES
// ---

#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Organizations",
    responses((status = 200, description = "Organizações cadastradas", body = [Organization])),
    security(("api_jwt" = []))
)]
pub async fn list_organizations(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
) -> Result<impl IntoResponse, ApiError> {
    let organizations = app_state
        .organization_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(organizations)))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 200, description = "Organização", body = Organization)),
    security(("api_jwt" = []))
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .organization_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(organization)))
}

#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Organizations",
    request_body = OrganizationPayload,
    responses((status = 201, description = "Organização criada", body = Organization)),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Json(payload): Json<OrganizationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .organization_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    put,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    request_body = OrganizationPayload,
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 200, description = "Organização atualizada", body = Organization)),
    security(("api_jwt" = []))
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
    Json(payload): Json<OrganizationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .organization_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(organization)))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    tag = "Organizations",
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 204, description = "Organização excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .organization_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// MEMBROS
// ---

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/members",
    tag = "Organizations",
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 200, description = "Membros com os dados do contato", body = [OrganizationMember])),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .organization_service
        .members(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    tag = "Organizations",
    request_body = AddMemberPayload,
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 204, description = "Contato associado")),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .organization_service
        .add_member(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/organizations/{id}/members/{contact_id}",
    tag = "Organizations",
    request_body = UpdateMemberSharePayload,
    params(
        ("id" = i64, Path, description = "ID da organização"),
        ("contact_id" = i64, Path, description = "ID do contato")
    ),
    responses((status = 204, description = "Preferência de compartilhamento alterada")),
    security(("api_jwt" = []))
)]
pub async fn update_member_share(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path((id, contact_id)): Path<(DbId, DbId)>,
    Json(payload): Json<UpdateMemberSharePayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .organization_service
        .update_member_share(id, contact_id, payload.share_tickets_by_default)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{contact_id}",
    tag = "Organizations",
    params(
        ("id" = i64, Path, description = "ID da organização"),
        ("contact_id" = i64, Path, description = "ID do contato")
    ),
    responses((status = 204, description = "Contato desassociado")),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path((id, contact_id)): Path<(DbId, DbId)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .organization_service
        .remove_member(id, contact_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// DOMÍNIOS
// ---

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/domains",
    tag = "Organizations",
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 200, description = "Domínios de e-mail da organização", body = [OrganizationDomain])),
    security(("api_jwt" = []))
)]
pub async fn list_domains(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    let domains = app_state
        .organization_service
        .domains(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(domains)))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/domains",
    tag = "Organizations",
    request_body = DomainPayload,
    params(("id" = i64, Path, description = "ID da organização")),
    responses((status = 201, description = "Domínio adicionado", body = OrganizationDomain)),
    security(("api_jwt" = []))
)]
pub async fn add_domain(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path(id): Path<DbId>,
    Json(payload): Json<DomainPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let domain = app_state
        .organization_service
        .add_domain(id, &payload.domain)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(domain)))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/domains/{domain}",
    tag = "Organizations",
    params(
        ("id" = i64, Path, description = "ID da organização"),
        ("domain" = String, Path, description = "Domínio, ex.: acme.com")
    ),
    responses((status = 204, description = "Domínio removido")),
    security(("api_jwt" = []))
)]
pub async fn remove_domain(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermOrganizationsManage>,
    Path((id, domain)): Path<(DbId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .organization_service
        .remove_domain(id, &domain)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
