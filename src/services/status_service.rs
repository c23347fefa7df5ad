// src/services/status_service.rs

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{duration::parse_duration, error::AppError},
    db::{ConversationStore, InboxStore, StatusStore, Stores, UserStore},
    models::{
        actor::Actor,
        conversation::Conversation,
        status::{is_default_status, Status, StatusNamePayload, StatusTarget, STATUS_RESOLVED, STATUS_SNOOZED},
        DbId,
    },
    services::{
        mailer::{with_timeout, Mailer},
        notifier::{EventKind, EventNotifier, LifecycleEvent},
    },
};

/// Converte o valor de soneca ("2h", "30m") no instante final.
fn snooze_deadline(raw: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    let invalid = || AppError::input_named("globals.invalid", "`snoozed_until`");
    let raw = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(invalid)?;
    let duration = parse_duration(raw).map_err(|_| invalid())?;
    if duration <= chrono::Duration::zero() {
        return Err(invalid());
    }
    now.checked_add_signed(duration).ok_or_else(invalid)
}

/// Máquina de estados dos status e administração dos status customizados.
#[derive(Clone)]
pub struct StatusService {
    conversations: Arc<dyn ConversationStore>,
    statuses: Arc<dyn StatusStore>,
    inboxes: Arc<dyn InboxStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn EventNotifier>,
    side_effect_timeout: Duration,
}

impl StatusService {
    pub fn new(
        stores: &Stores,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn EventNotifier>,
        side_effect_timeout: Duration,
    ) -> Self {
        Self {
            conversations: stores.conversations.clone(),
            statuses: stores.statuses.clone(),
            inboxes: stores.inboxes.clone(),
            users: stores.users.clone(),
            mailer,
            notifier,
            side_effect_timeout,
        }
    }

    async fn resolve_target(&self, target: &StatusTarget) -> Result<Status, AppError> {
        match target {
            StatusTarget::Id(id) => self
                .statuses
                .get(*id)
                .await?
                .ok_or(AppError::NotFound("status")),
            StatusTarget::Name(name) => self
                .statuses
                .list()
                .await?
                .into_iter()
                .find(|s| s.name == *name)
                .ok_or_else(|| AppError::input_named("globals.invalid", "`status`")),
        }
    }

    /// Executa a transição. Guards primeiro; nenhum guard falho chega a gravar.
    ///
    /// Ao resolver, a pesquisa CSAT é enviada depois da gravação: se falhar,
    /// o erro sobe mas o status já está salvo.
    pub async fn transition(
        &self,
        conversation: &Conversation,
        target: &StatusTarget,
        snoozed_until: Option<&str>,
        actor: &Actor,
    ) -> Result<Conversation, AppError> {
        let status = self.resolve_target(target).await?;

        let deadline = match status.id {
            STATUS_SNOOZED => Some(snooze_deadline(snoozed_until, Utc::now())?),
            STATUS_RESOLVED if conversation.assigned_user_id.is_none() => {
                return Err(AppError::input("conversation.resolveWithoutAssignee"));
            }
            _ => None,
        };

        self.conversations
            .save_status(conversation.uuid, status.id, deadline)
            .await?;

        let mut updated = conversation.clone();
        updated.status_id = status.id;
        updated.snoozed_until = deadline;

        tracing::info!(
            conversation = %conversation.uuid,
            from = conversation.status_id,
            to = status.id,
            actor_id = actor.id(),
            "Status alterado"
        );
        self.notifier.emit(LifecycleEvent::new(
            EventKind::StatusChanged,
            conversation.uuid,
            actor,
            json!({
                "previousStatusId": conversation.status_id,
                "statusId": status.id,
                "status": status.name,
                "snoozedUntil": deadline,
            }),
        ));

        if status.id == STATUS_RESOLVED {
            self.dispatch_csat(&updated).await?;
        }
        Ok(updated)
    }

    async fn dispatch_csat(&self, conversation: &Conversation) -> Result<(), AppError> {
        let Some(inbox) = self.inboxes.get(conversation.inbox_id).await? else {
            return Ok(());
        };
        if !inbox.csat_enabled {
            return Ok(());
        }

        let recipient = self
            .users
            .get_contact(conversation.contact_id)
            .await?
            .and_then(|c| c.email);
        let Some(recipient) = recipient else {
            tracing::warn!(conversation = %conversation.uuid, "Contato sem e-mail, CSAT não enviado");
            return Ok(());
        };

        with_timeout(
            self.side_effect_timeout,
            "csat",
            self.mailer.send_survey(conversation, &recipient),
        )
        .await
        .inspect_err(|e| tracing::error!(conversation = %conversation.uuid, error = %e, "Falha ao enviar CSAT"))?;

        tracing::info!(conversation = %conversation.uuid, "Pesquisa CSAT enviada");
        Ok(())
    }

    // --- ADMINISTRAÇÃO ---

    pub async fn list(&self) -> Result<Vec<Status>, AppError> {
        self.statuses.list().await
    }

    pub async fn create(&self, payload: &StatusNamePayload) -> Result<Status, AppError> {
        payload.validate()?;
        self.statuses.create(payload.name.trim()).await
    }

    pub async fn rename(&self, id: DbId, payload: &StatusNamePayload) -> Result<Status, AppError> {
        payload.validate()?;
        self.statuses
            .rename(id, payload.name.trim())
            .await?
            .ok_or(AppError::NotFound("status"))
    }

    pub async fn delete(&self, id: DbId) -> Result<(), AppError> {
        self.statuses
            .get(id)
            .await?
            .ok_or(AppError::NotFound("status"))?;
        if is_default_status(id) {
            return Err(AppError::input("status.cannotDeleteDefault"));
        }
        self.statuses.delete(id).await
    }
}
