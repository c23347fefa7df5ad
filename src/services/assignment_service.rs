// src/services/assignment_service.rs

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{ConversationStore, Stores, TeamStore, UserStore},
    models::{actor::Actor, conversation::Conversation, DbId},
    services::notifier::{EventKind, EventNotifier, LifecycleEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeKind {
    User,
    Team,
}

/// Regras de atribuição. O guard de acesso é responsabilidade de quem chama.
///
/// Trocar o time limpa o agente atribuído; atribuir o mesmo agente ou time
/// de novo não grava nada nem emite evento.
#[derive(Clone)]
pub struct AssignmentEngine {
    conversations: Arc<dyn ConversationStore>,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl AssignmentEngine {
    pub fn new(stores: &Stores, notifier: Arc<dyn EventNotifier>) -> Self {
        Self {
            conversations: stores.conversations.clone(),
            users: stores.users.clone(),
            teams: stores.teams.clone(),
            notifier,
        }
    }

    pub async fn assign_user(&self, conversation: &Conversation, user_id: DbId, actor: &Actor) -> Result<Conversation, AppError> {
        self.users
            .get_agent(user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        if conversation.assigned_user_id == Some(user_id) {
            return Ok(conversation.clone());
        }

        self.conversations
            .save_assignment(conversation.uuid, Some(user_id), conversation.assigned_team_id)
            .await?;

        let mut updated = conversation.clone();
        updated.assigned_user_id = Some(user_id);

        tracing::info!(conversation = %conversation.uuid, user_id, actor_id = actor.id(), "Agente atribuído");
        self.notifier.emit(LifecycleEvent::new(
            EventKind::UserAssigned,
            conversation.uuid,
            actor,
            json!({
                "assigneeId": user_id,
                "previousAssigneeId": conversation.assigned_user_id,
            }),
        ));
        Ok(updated)
    }

    pub async fn assign_team(&self, conversation: &Conversation, team_id: DbId, actor: &Actor) -> Result<Conversation, AppError> {
        self.teams
            .get(team_id)
            .await?
            .ok_or(AppError::NotFound("team"))?;

        if conversation.assigned_team_id == Some(team_id) {
            return Ok(conversation.clone());
        }

        // Time novo: o agente anterior pode não fazer parte dele
        self.conversations
            .save_assignment(conversation.uuid, None, Some(team_id))
            .await?;

        let mut updated = conversation.clone();
        updated.assigned_team_id = Some(team_id);
        updated.assigned_user_id = None;

        tracing::info!(conversation = %conversation.uuid, team_id, actor_id = actor.id(), "Time atribuído");
        self.notifier.emit(LifecycleEvent::new(
            EventKind::TeamAssigned,
            conversation.uuid,
            actor,
            json!({
                "teamId": team_id,
                "previousTeamId": conversation.assigned_team_id,
                "clearedUserId": conversation.assigned_user_id,
            }),
        ));
        Ok(updated)
    }

    /// Aplica time e depois agente, nessa ordem.
    pub async fn apply(
        &self,
        conversation: &Conversation,
        team_id: Option<DbId>,
        user_id: Option<DbId>,
        actor: &Actor,
    ) -> Result<Conversation, AppError> {
        let mut current = conversation.clone();
        if let Some(team_id) = team_id {
            current = self.assign_team(&current, team_id, actor).await?;
        }
        if let Some(user_id) = user_id {
            current = self.assign_user(&current, user_id, actor).await?;
        }
        Ok(current)
    }

    /// Remover o time mantém o agente.
    pub async fn unassign(&self, conversation: &Conversation, kind: AssigneeKind, actor: &Actor) -> Result<Conversation, AppError> {
        let mut updated = conversation.clone();
        let (event, previous) = match kind {
            AssigneeKind::User => {
                let Some(previous) = conversation.assigned_user_id else {
                    return Ok(updated);
                };
                updated.assigned_user_id = None;
                (EventKind::UserUnassigned, previous)
            }
            AssigneeKind::Team => {
                let Some(previous) = conversation.assigned_team_id else {
                    return Ok(updated);
                };
                updated.assigned_team_id = None;
                (EventKind::TeamUnassigned, previous)
            }
        };

        self.conversations
            .save_assignment(conversation.uuid, updated.assigned_user_id, updated.assigned_team_id)
            .await?;

        tracing::info!(conversation = %conversation.uuid, previous, actor_id = actor.id(), "Atribuição removida");
        self.notifier.emit(LifecycleEvent::new(
            event,
            conversation.uuid,
            actor,
            json!({ "previousId": previous }),
        ));
        Ok(updated)
    }
}
