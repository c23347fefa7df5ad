// src/services/conversation_service.rs

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ConversationStore, InboxStore, OrganizationStore, Stores, TeamStore, UserStore, ViewStore},
    models::{
        actor::{Actor, Agent, ContactIdentity},
        contact::{Contact, NewContact},
        conversation::{
            normalize_tags, Conversation, ConversationDetail, CreateConversationPayload, Initiator, Message,
            NewConversation, NewMessage, PortalClosePayload, PortalCreateConversationPayload, PortalMessagePayload,
        },
        inbox::Inbox,
        pagination::{ListParams, OrderBy, PageResults, Pagination, SortOrder},
        scope::{ConversationQuery, ListTarget, Scope, ScopeClause},
        settings::AppSettings,
        status::{StatusTarget, UpdateStatusPayload, STATUS_CLOSED},
        view::{View, ViewFilter, ViewVisibility},
        DbId,
    },
    services::{
        access_guard::AccessGuard,
        assignment_service::{AssigneeKind, AssignmentEngine},
        notifier::{EventKind, EventNotifier, LifecycleEvent},
        organization_service::OrganizationService,
        permission_resolver::resolve_scopes,
        status_service::StatusService,
    },
};

/// Operações sobre conversas, sempre passando pelo guard de acesso.
#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationStore>,
    users: Arc<dyn UserStore>,
    inboxes: Arc<dyn InboxStore>,
    teams: Arc<dyn TeamStore>,
    views: Arc<dyn ViewStore>,
    organizations: Arc<dyn OrganizationStore>,
    guard: AccessGuard,
    assignment: AssignmentEngine,
    status: StatusService,
    organization_service: OrganizationService,
    notifier: Arc<dyn EventNotifier>,
}

impl ConversationService {
    pub fn new(
        stores: &Stores,
        guard: AccessGuard,
        assignment: AssignmentEngine,
        status: StatusService,
        organization_service: OrganizationService,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            conversations: stores.conversations.clone(),
            users: stores.users.clone(),
            inboxes: stores.inboxes.clone(),
            teams: stores.teams.clone(),
            views: stores.views.clone(),
            organizations: stores.organizations.clone(),
            guard,
            assignment,
            status,
            organization_service,
            notifier,
        }
    }

    // =========================================================================
    //  LISTAGENS (AGENTE)
    // =========================================================================

    pub async fn list(
        &self,
        agent: &Agent,
        target: ListTarget,
        params: &ListParams,
    ) -> Result<PageResults<Conversation>, AppError> {
        let (clauses, filters) = match target {
            ListTarget::View(view_id) => self.view_query(agent, view_id).await?,
            ListTarget::TeamUnassigned(team_id) | ListTarget::TeamAll(team_id) => {
                self.teams
                    .get(team_id)
                    .await?
                    .ok_or(AppError::NotFound("team"))?;
                let scopes = resolve_scopes(&agent.permissions)?;
                Self::require_cover(&scopes, target)?;
                if !agent.is_member_of(team_id) {
                    return Err(AppError::PermissionDenied("conversation.notMemberOfTeam"));
                }
                let clause = match target {
                    ListTarget::TeamUnassigned(_) => ScopeClause::TeamUnassigned(vec![team_id]),
                    _ => ScopeClause::TeamAll(vec![team_id]),
                };
                (vec![clause], Vec::new())
            }
            ListTarget::Mentioned => {
                // Basta ter algum escopo de leitura
                resolve_scopes(&agent.permissions)?;
                (vec![Scope::Mentioned.clause_for(agent)], Vec::new())
            }
            ListTarget::All | ListTarget::Unassigned | ListTarget::Assigned => {
                let scopes = resolve_scopes(&agent.permissions)?;
                let scope = Self::require_cover(&scopes, target)?;
                (vec![scope.clause_for(agent)], Vec::new())
            }
        };

        let pagination = Pagination::new(params.page, params.page_size);
        let query = ConversationQuery {
            clauses,
            filters,
            order_by: OrderBy::parse(params.order_by.as_deref()),
            order: SortOrder::parse(params.order.as_deref()),
            pagination,
        };
        let (results, total) = self.conversations.list(&query).await?;
        Ok(PageResults::new(results, total, pagination))
    }

    fn require_cover(scopes: &[Scope], target: ListTarget) -> Result<Scope, AppError> {
        let wanted = target
            .scope()
            .ok_or(AppError::PermissionDenied("globals.permissionDenied"))?;
        if scopes.iter().any(|s| s.covers(wanted)) {
            Ok(wanted)
        } else {
            Err(AppError::PermissionDenied("globals.permissionDenied"))
        }
    }

    async fn can_use_view(&self, agent: &Agent, view: &View) -> Result<bool, AppError> {
        match view.visibility {
            ViewVisibility::All => Ok(true),
            ViewVisibility::User => Ok(view.user_id == Some(agent.id)),
            ViewVisibility::Team => match view.team_id {
                Some(team_id) => self.teams.user_belongs_to_team(team_id, agent.id).await,
                None => Ok(false),
            },
        }
    }

    /// Visibilidade da view primeiro; depois os escopos do agente com os filtros por cima.
    async fn view_query(&self, agent: &Agent, view_id: DbId) -> Result<(Vec<ScopeClause>, Vec<ViewFilter>), AppError> {
        let view = self
            .views
            .get(view_id)
            .await?
            .ok_or(AppError::NotFound("view"))?;

        if !self.can_use_view(agent, &view).await? {
            return Err(AppError::PermissionDenied("conversation.viewPermissionDenied"));
        }

        let scopes = resolve_scopes(&agent.permissions)?;
        let filters = ViewFilter::parse_list(&view.filters)
            .ok_or_else(|| AppError::input_named("globals.invalid", "`filters`"))?;
        let clauses = scopes.iter().map(|s| s.clause_for(agent)).collect();
        Ok((clauses, filters))
    }

    // =========================================================================
    //  DETALHE E MUTAÇÕES
    // =========================================================================

    pub async fn detail(&self, actor: &Actor, uuid: Uuid) -> Result<ConversationDetail, AppError> {
        let conversation = self.guard.enforce(actor, uuid).await?;
        // Notas privadas só para agentes
        let include_private = matches!(actor, Actor::Agent(_));
        let messages = self
            .conversations
            .list_messages(conversation.id, include_private)
            .await?;
        Ok(ConversationDetail { conversation, messages })
    }

    pub async fn assign_user(&self, actor: &Actor, uuid: Uuid, user_id: DbId) -> Result<Conversation, AppError> {
        let conversation = self.guard.enforce(actor, uuid).await?;
        self.assignment.assign_user(&conversation, user_id, actor).await
    }

    pub async fn assign_team(&self, actor: &Actor, uuid: Uuid, team_id: DbId) -> Result<Conversation, AppError> {
        let conversation = self.guard.enforce(actor, uuid).await?;
        self.assignment.assign_team(&conversation, team_id, actor).await
    }

    pub async fn unassign(&self, actor: &Actor, uuid: Uuid, kind: AssigneeKind) -> Result<Conversation, AppError> {
        let conversation = self.guard.enforce(actor, uuid).await?;
        self.assignment.unassign(&conversation, kind, actor).await
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        uuid: Uuid,
        payload: &UpdateStatusPayload,
    ) -> Result<Conversation, AppError> {
        let conversation = self.guard.enforce(actor, uuid).await?;
        let target = payload
            .target()
            .ok_or_else(|| AppError::input_named("globals.required", "`status`"))?;
        self.status
            .transition(&conversation, &target, payload.snoozed_until.as_deref(), actor)
            .await
    }

    /// Recalcula a organização a partir da associação atual do contato.
    pub async fn update_share_with_organization(
        &self,
        actor: &Actor,
        uuid: Uuid,
        shared: bool,
    ) -> Result<Conversation, AppError> {
        let mut conversation = self.guard.enforce(actor, uuid).await?;
        let organization_id = if shared {
            self.organization_service
                .resolve_share_org_id(conversation.contact_id, Some(true))
                .await?
        } else {
            None
        };
        self.conversations
            .update_organization_id(uuid, organization_id)
            .await?;
        tracing::info!(conversation = %uuid, ?organization_id, "Compartilhamento com organização atualizado");
        conversation.organization_id = organization_id;
        Ok(conversation)
    }

    pub async fn set_tags(&self, actor: &Actor, uuid: Uuid, tags: &[String]) -> Result<Conversation, AppError> {
        let mut conversation = self.guard.enforce(actor, uuid).await?;
        let tags = normalize_tags(tags);
        if tags == conversation.tags {
            return Ok(conversation);
        }

        self.conversations.set_tags(uuid, &tags).await?;
        let previous = std::mem::replace(&mut conversation.tags, tags);
        self.notifier.emit(LifecycleEvent::new(
            EventKind::TagsChanged,
            uuid,
            actor,
            json!({ "previousTags": previous, "tags": conversation.tags }),
        ));
        Ok(conversation)
    }

    pub async fn update_custom_attributes(
        &self,
        actor: &Actor,
        uuid: Uuid,
        attributes: Value,
    ) -> Result<Conversation, AppError> {
        if !attributes.is_object() {
            return Err(AppError::input_named("globals.invalid", "`custom_attributes`"));
        }
        let mut conversation = self.guard.enforce(actor, uuid).await?;
        self.conversations
            .update_custom_attributes(uuid, &attributes)
            .await?;
        conversation.custom_attributes = attributes;
        Ok(conversation)
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    async fn open_inbox(&self, inbox_id: DbId) -> Result<Inbox, AppError> {
        let inbox = self
            .inboxes
            .get(inbox_id)
            .await?
            .ok_or(AppError::NotFound("inbox"))?;
        if !inbox.enabled {
            return Err(AppError::input("inbox.disabled"));
        }
        Ok(inbox)
    }

    async fn find_or_create_contact(&self, payload: &CreateConversationPayload, inbox_id: DbId) -> Result<Contact, AppError> {
        let email = payload.contact_email.trim().to_lowercase();
        if let Some(existing) = self.users.find_contact_by_email(&email).await? {
            return Ok(existing);
        }

        let contact = self
            .users
            .create_contact(&NewContact {
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                email: email.clone(),
                phone_number: None,
                inbox_id: Some(inbox_id),
            })
            .await?;
        tracing::info!(contact_id = contact.id, "Contato criado a partir de nova conversa");
        self.organization_service
            .sync_domain_memberships(contact.id, &email)
            .await;
        Ok(contact)
    }

    /// Cria a conversa e grava a primeira mensagem. Se a mensagem falhar,
    /// a conversa é apagada e o erro devolvido.
    async fn open_conversation(
        &self,
        new: NewConversation,
        first_message: impl FnOnce(DbId) -> NewMessage,
        actor: &Actor,
    ) -> Result<Conversation, AppError> {
        let conversation = self.conversations.create(&new).await?;

        if let Err(e) = self
            .conversations
            .insert_message(&first_message(conversation.id))
            .await
        {
            tracing::error!(conversation = %conversation.uuid, error = %e, "Falha na primeira mensagem, desfazendo conversa");
            if let Err(cleanup) = self.conversations.delete(conversation.uuid).await {
                tracing::error!(conversation = %conversation.uuid, error = %cleanup, "Falha ao apagar conversa órfã");
            }
            return Err(e);
        }

        tracing::info!(conversation = %conversation.uuid, actor_id = actor.id(), "Conversa criada");
        self.notifier.emit(LifecycleEvent::new(
            EventKind::ConversationCreated,
            conversation.uuid,
            actor,
            json!({
                "contactId": conversation.contact_id,
                "inboxId": conversation.inbox_id,
                "organizationId": conversation.organization_id,
            }),
        ));
        Ok(conversation)
    }

    /// Conversa aberta por um agente a partir do painel.
    pub async fn create(&self, agent: &Agent, payload: &CreateConversationPayload) -> Result<Conversation, AppError> {
        payload.validate()?;
        let initiator = Initiator::parse(payload.initiator.trim())
            .ok_or_else(|| AppError::input_named("globals.invalid", "`initiator`"))?;

        let inbox = self.open_inbox(payload.inbox_id).await?;
        let contact = self.find_or_create_contact(payload, inbox.id).await?;
        let organization_id = self
            .organization_service
            .resolve_share_org_id(contact.id, payload.share_with_organization)
            .await?;

        let actor = Actor::Agent(agent.clone());
        let content = payload.content.clone();
        let (agent_id, contact_id) = (agent.id, contact.id);
        let conversation = self
            .open_conversation(
                NewConversation {
                    contact_id: contact.id,
                    inbox_id: inbox.id,
                    subject: payload.subject.clone(),
                    organization_id,
                },
                move |conversation_id| match initiator {
                    Initiator::Agent => NewMessage::agent_reply(conversation_id, agent_id, &content),
                    Initiator::Contact => NewMessage::from_contact(conversation_id, contact_id, &content),
                },
                &actor,
            )
            .await?;

        // Time antes do agente; erros sobem para o chamador
        self.assignment
            .apply(&conversation, payload.team_id, payload.agent_id, &actor)
            .await
    }

    // =========================================================================
    //  PORTAL (CONTATO)
    // =========================================================================

    /// Conversas próprias mais as compartilhadas com a organização atual.
    pub async fn portal_list(&self, contact: &ContactIdentity, params: &ListParams) -> Result<PageResults<Conversation>, AppError> {
        let membership = self.organizations.membership_for_contact(contact.id).await?;
        let pagination = Pagination::new(params.page, params.page_size);
        let (results, total) = self
            .conversations
            .list_for_contact(contact.id, membership.map(|m| m.organization_id), pagination)
            .await?;
        Ok(PageResults::new(results, total, pagination))
    }

    pub async fn portal_create(
        &self,
        contact: &ContactIdentity,
        settings: &AppSettings,
        payload: &PortalCreateConversationPayload,
    ) -> Result<Conversation, AppError> {
        payload.validate()?;
        let inbox_id = settings
            .portal_inbox()
            .ok_or(AppError::input("portal.defaultInboxRequired"))?;
        let inbox = self.open_inbox(inbox_id).await?;
        let organization_id = self
            .organization_service
            .resolve_share_org_id(contact.id, payload.share_with_organization)
            .await?;

        let actor = Actor::Contact(contact.clone());
        let (contact_id, content) = (contact.id, payload.content.clone());
        self.open_conversation(
            NewConversation {
                contact_id,
                inbox_id: inbox.id,
                subject: payload.subject.clone(),
                organization_id,
            },
            move |conversation_id| NewMessage::from_contact(conversation_id, contact_id, &content),
            &actor,
        )
        .await
    }

    pub async fn portal_send_message(
        &self,
        contact: &ContactIdentity,
        uuid: Uuid,
        payload: &PortalMessagePayload,
    ) -> Result<Message, AppError> {
        payload.validate()?;
        let actor = Actor::Contact(contact.clone());
        let conversation = self.guard.enforce(&actor, uuid).await?;
        self.conversations
            .insert_message(&NewMessage::from_contact(conversation.id, contact.id, &payload.message))
            .await
    }

    /// Grava o comentário como mensagem do contato e fecha a conversa.
    pub async fn portal_close(
        &self,
        contact: &ContactIdentity,
        uuid: Uuid,
        payload: &PortalClosePayload,
    ) -> Result<Conversation, AppError> {
        payload.validate()?;
        let actor = Actor::Contact(contact.clone());
        let conversation = self.guard.enforce(&actor, uuid).await?;
        self.conversations
            .insert_message(&NewMessage::from_contact(conversation.id, contact.id, &payload.comment))
            .await?;
        self.status
            .transition(&conversation, &StatusTarget::Id(STATUS_CLOSED), None, &actor)
            .await
    }
}
