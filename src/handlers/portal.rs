// src/handlers/portal.rs

// Rotas do portal do cliente. Todas passam pelo `portal_guard`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedContact, i18n::Locale, portal::PortalSettings},
    models::{
        actor::{Actor, ContactIdentity},
        conversation::{
            Conversation, ConversationDetail, Message, PortalClosePayload, PortalCreateConversationPayload,
            PortalMessagePayload,
        },
        pagination::ListParams,
    },
};

#[utoipa::path(
    get,
    path = "/api/portal/me",
    tag = "Portal",
    responses((status = 200, description = "Contato autenticado", body = ContactIdentity)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedContact(contact): AuthenticatedContact) -> Json<ContactIdentity> {
    Json(contact)
}

#[utoipa::path(
    get,
    path = "/api/portal/conversations",
    tag = "Portal",
    params(ListParams),
    responses((status = 200, description = "Conversas próprias e compartilhadas com a organização", body = [Conversation])),
    security(("api_jwt" = []))
)]
pub async fn list_conversations(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedContact(contact): AuthenticatedContact,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .conversation_service
        .portal_list(&contact, &params)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    post,
    path = "/api/portal/conversations",
    tag = "Portal",
    request_body = PortalCreateConversationPayload,
    responses(
        (status = 201, description = "Conversa aberta na caixa de entrada padrão do portal", body = Conversation),
        (status = 400, description = "Caixa de entrada padrão não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedContact(contact): AuthenticatedContact,
    PortalSettings(settings): PortalSettings,
    Json(payload): Json<PortalCreateConversationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .portal_create(&contact, &settings, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

#[utoipa::path(
    get,
    path = "/api/portal/conversations/{uuid}",
    tag = "Portal",
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses(
        (status = 200, description = "Conversa sem as notas privadas", body = ConversationDetail),
        (status = 403, description = "Conversa de outro contato")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedContact(contact): AuthenticatedContact,
    Path(uuid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .conversation_service
        .detail(&Actor::Contact(contact), uuid)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/portal/conversations/{uuid}/messages",
    tag = "Portal",
    request_body = PortalMessagePayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 201, description = "Mensagem enviada", body = Message)),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedContact(contact): AuthenticatedContact,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<PortalMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .conversation_service
        .portal_send_message(&contact, uuid, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    post,
    path = "/api/portal/conversations/{uuid}/close",
    tag = "Portal",
    request_body = PortalClosePayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Comentário gravado e conversa fechada", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn close_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedContact(contact): AuthenticatedContact,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<PortalClosePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .portal_close(&contact, uuid, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}
