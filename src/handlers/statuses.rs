// src/handlers/statuses.rs

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
        auth::AuthenticatedAgent,
        i18n::Locale,
        rbac::{PermStatusManage, RequirePermission},
    },
    models::{
        status::{Status, StatusNamePayload},
        DbId,
    },
};

#[utoipa::path(
    get,
    path = "/api/statuses",
    tag = "Statuses",
    responses((status = 200, description = "Status com a marcação dos padrões", body = [Status])),
    security(("api_jwt" = []))
)]
pub async fn list_statuses(
    State(app_state): State<AppState>,
    locale: Locale,
    _agent: AuthenticatedAgent,
) -> Result<impl IntoResponse, ApiError> {
    let statuses = app_state
        .status_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(statuses)))
}

#[utoipa::path(
    post,
    path = "/api/statuses",
    tag = "Statuses",
    request_body = StatusNamePayload,
    responses((status = 201, description = "Status personalizado criado", body = Status)),
    security(("api_jwt" = []))
)]
pub async fn create_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermStatusManage>,
    Json(payload): Json<StatusNamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .status_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(status)))
}

#[utoipa::path(
    put,
    path = "/api/statuses/{id}",
    tag = "Statuses",
    request_body = StatusNamePayload,
    params(("id" = i64, Path, description = "ID do status")),
    responses((status = 200, description = "Status renomeado", body = Status)),
    security(("api_jwt" = []))
)]
pub async fn rename_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermStatusManage>,
    Path(id): Path<DbId>,
    Json(payload): Json<StatusNamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .status_service
        .rename(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

#[utoipa::path(
    delete,
    path = "/api/statuses/{id}",
    tag = "Statuses",
    params(("id" = i64, Path, description = "ID do status")),
    responses(
        (status = 204, description = "Status excluído"),
        (status = 400, description = "Status padrão não pode ser excluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermStatusManage>,
    Path(id): Path<DbId>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .status_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
