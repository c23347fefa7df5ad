// src/handlers/conversations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::{AuthenticatedAgent, CurrentActor},
        i18n::Locale,
        rbac::{
            PermConversationsWrite, PermUpdateStatus, PermUpdateTags, PermUpdateTeamAssignee,
            PermUpdateUserAssignee, RequirePermission,
        },
    },
    models::{
        actor::{Actor, Agent},
        conversation::{
            AssigneePayload, Conversation, ConversationDetail, CreateConversationPayload, SharePayload,
            TagsPayload,
        },
        pagination::{ListParams, PageResults},
        scope::ListTarget,
        status::UpdateStatusPayload,
        DbId,
    },
    services::assignment_service::AssigneeKind,
};

async fn list_target(
    app_state: &AppState,
    locale: &Locale,
    agent: &Agent,
    target: ListTarget,
    params: &ListParams,
) -> Result<(StatusCode, Json<PageResults<Conversation>>), ApiError> {
    let page = app_state
        .conversation_service
        .list(agent, target, params)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// ---
// LISTAGENS
// ---

#[utoipa::path(
    get,
    path = "/api/conversations/all",
    tag = "Conversations",
    params(ListParams),
    responses(
        (status = 200, description = "Página com todas as conversas", body = [Conversation]),
        (status = 403, description = "Sem permissão de leitura geral")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::All, &params).await
}

#[utoipa::path(
    get,
    path = "/api/conversations/unassigned",
    tag = "Conversations",
    params(ListParams),
    responses((status = 200, description = "Conversas sem agente e sem time", body = [Conversation])),
    security(("api_jwt" = []))
)]
pub async fn list_unassigned(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::Unassigned, &params).await
}

#[utoipa::path(
    get,
    path = "/api/conversations/assigned",
    tag = "Conversations",
    params(ListParams),
    responses((status = 200, description = "Conversas atribuídas a mim", body = [Conversation])),
    security(("api_jwt" = []))
)]
pub async fn list_assigned(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::Assigned, &params).await
}

#[utoipa::path(
    get,
    path = "/api/conversations/mentioned",
    tag = "Conversations",
    params(ListParams),
    responses((status = 200, description = "Conversas em que fui mencionado", body = [Conversation])),
    security(("api_jwt" = []))
)]
pub async fn list_mentioned(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::Mentioned, &params).await
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/conversations/unassigned",
    tag = "Conversations",
    params(
        ("team_id" = i64, Path, description = "ID do time"),
        ListParams
    ),
    responses(
        (status = 200, description = "Conversas do time sem agente", body = [Conversation]),
        (status = 403, description = "Não é membro do time"),
        (status = 404, description = "Time não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_team_unassigned(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(team_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::TeamUnassigned(team_id), &params).await
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/conversations/all",
    tag = "Conversations",
    params(
        ("team_id" = i64, Path, description = "ID do time"),
        ListParams
    ),
    responses((status = 200, description = "Todas as conversas do time", body = [Conversation])),
    security(("api_jwt" = []))
)]
pub async fn list_team_all(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(team_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::TeamAll(team_id), &params).await
}

#[utoipa::path(
    get,
    path = "/api/views/{view_id}/conversations",
    tag = "Conversations",
    params(
        ("view_id" = i64, Path, description = "ID da view"),
        ListParams
    ),
    responses(
        (status = 200, description = "Conversas filtradas pela view", body = [Conversation]),
        (status = 400, description = "Filtros da view inválidos"),
        (status = 403, description = "View não visível para o agente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_view(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(view_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    list_target(&app_state, &locale, &agent, ListTarget::View(view_id), &params).await
}

// ---
// CRIAÇÃO E DETALHE
// ---

#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "Conversations",
    request_body = CreateConversationPayload,
    responses(
        (status = 201, description = "Conversa criada com a primeira mensagem", body = Conversation),
        (status = 400, description = "Dados inválidos ou caixa de entrada desativada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermConversationsWrite>,
    Json(payload): Json<CreateConversationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .create(&agent, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{uuid}",
    tag = "Conversations",
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses(
        (status = 200, description = "Conversa com as mensagens", body = ConversationDetail),
        (status = 403, description = "Sem acesso à conversa"),
        (status = 404, description = "Conversa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentActor(actor): CurrentActor,
    Path(uuid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .conversation_service
        .detail(&actor, uuid)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// ---
// ATRIBUIÇÃO
// ---

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/assignee/user",
    tag = "Conversations",
    request_body = AssigneePayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Agente atribuído", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn assign_user(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermUpdateUserAssignee>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<AssigneePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .assign_user(&Actor::Agent(agent), uuid, payload.assignee_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/assignee/team",
    tag = "Conversations",
    request_body = AssigneePayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Time atribuído (o agente é removido)", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn assign_team(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermUpdateTeamAssignee>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<AssigneePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .assign_team(&Actor::Agent(agent), uuid, payload.assignee_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

#[utoipa::path(
    delete,
    path = "/api/conversations/{uuid}/assignee/{kind}",
    tag = "Conversations",
    params(
        ("uuid" = Uuid, Path, description = "UUID da conversa"),
        ("kind" = AssigneeKind, Path, description = "user ou team")
    ),
    responses((status = 200, description = "Atribuição removida", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn unassign(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path((uuid, kind)): Path<(Uuid, AssigneeKind)>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .unassign(&Actor::Agent(agent), uuid, kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

// ---
// STATUS, TAGS E ATRIBUTOS
// ---

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/status",
    tag = "Conversations",
    request_body = UpdateStatusPayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses(
        (status = 200, description = "Status alterado", body = Conversation),
        (status = 400, description = "Transição inválida (ex.: resolver sem agente)"),
        (status = 502, description = "Estado gravado, mas a pesquisa CSAT falhou")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermUpdateStatus>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .update_status(&Actor::Agent(agent), uuid, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/share",
    tag = "Conversations",
    request_body = SharePayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Compartilhamento atualizado", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn update_share(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermConversationsWrite>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<SharePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .update_share_with_organization(&Actor::Agent(agent), uuid, payload.shared_with_organization)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/tags",
    tag = "Conversations",
    request_body = TagsPayload,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Tags substituídas", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn set_tags(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermUpdateTags>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<TagsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .set_tags(&Actor::Agent(agent), uuid, &payload.tags)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}

#[utoipa::path(
    put,
    path = "/api/conversations/{uuid}/custom-attributes",
    tag = "Conversations",
    request_body = Value,
    params(("uuid" = Uuid, Path, description = "UUID da conversa")),
    responses((status = 200, description = "Atributos substituídos", body = Conversation)),
    security(("api_jwt" = []))
)]
pub async fn update_custom_attributes(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    _perm: RequirePermission<PermConversationsWrite>,
    Path(uuid): Path<Uuid>,
    Json(attributes): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .update_custom_attributes(&Actor::Agent(agent), uuid, attributes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversation)))
}
