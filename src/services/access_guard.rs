// src/services/access_guard.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ConversationStore, OrganizationStore, Stores},
    models::{
        actor::Actor,
        conversation::Conversation,
        scope::Scope,
    },
    services::permission_resolver::resolve_scopes,
};

/// Autorização de uma única conversa, chamada antes de qualquer leitura de
/// detalhe ou mutação. Sempre avaliada sobre o estado atual do banco.
#[derive(Clone)]
pub struct AccessGuard {
    conversations: Arc<dyn ConversationStore>,
    organizations: Arc<dyn OrganizationStore>,
}

impl AccessGuard {
    pub fn new(stores: &Stores) -> Self {
        Self {
            conversations: stores.conversations.clone(),
            organizations: stores.organizations.clone(),
        }
    }

    /// Predicado puro: não altera nada.
    pub async fn check_access(&self, actor: &Actor, conversation: &Conversation) -> Result<bool, AppError> {
        match actor {
            Actor::Agent(agent) => {
                let scopes = match resolve_scopes(&agent.permissions) {
                    Ok(scopes) => scopes,
                    Err(AppError::PermissionDenied(_)) => return Ok(false),
                    Err(e) => return Err(e),
                };

                let mentioned = if scopes.contains(&Scope::Mentioned) {
                    self.conversations.mentioned_user_ids(conversation.id).await?
                } else {
                    Vec::new()
                };

                Ok(scopes
                    .iter()
                    .any(|scope| scope.clause_for(agent).matches(conversation, &mentioned)))
            }
            Actor::Contact(contact) => {
                if conversation.contact_id == contact.id {
                    return Ok(true);
                }
                let Some(shared_with) = conversation.organization_id else {
                    return Ok(false);
                };
                // Associação relida a cada verificação
                let membership = self.organizations.membership_for_contact(contact.id).await?;
                Ok(membership.is_some_and(|m| m.organization_id == shared_with))
            }
        }
    }

    /// Busca a conversa e aplica o guard: existência primeiro, depois permissão.
    pub async fn enforce(&self, actor: &Actor, uuid: Uuid) -> Result<Conversation, AppError> {
        let conversation = self
            .conversations
            .get_by_uuid(uuid)
            .await?
            .ok_or(AppError::NotFound("conversation"))?;

        if !self.check_access(actor, &conversation).await? {
            tracing::warn!(conversation = %uuid, actor_id = actor.id(), "Acesso à conversa negado");
            return Err(AppError::PermissionDenied("globals.permissionDenied"));
        }
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::ErrorKind,
        db::memory::MemoryStore,
        models::permission,
    };

    #[tokio::test]
    async fn owner_contact_always_has_access() {
        let store = MemoryStore::new();
        let guard = AccessGuard::new(&store.stores());
        let inbox = store.add_inbox(true, false);
        let contact = store.add_contact("rui@acme.com");
        let conversation = store.add_conversation(contact.id, inbox);

        let actor = Actor::Contact(contact.identity());
        assert!(guard.check_access(&actor, &conversation).await.unwrap());
    }

    #[tokio::test]
    async fn shared_conversation_follows_current_membership() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let guard = AccessGuard::new(&stores);
        let inbox = store.add_inbox(true, false);
        let owner = store.add_contact("owner@acme.com");
        let colleague = store.add_contact("colleague@acme.com");
        let org = stores.organizations.create("Acme", None).await.unwrap();

        let conversation = store.add_conversation(owner.id, inbox);
        stores
            .conversations
            .update_organization_id(conversation.uuid, Some(org.id))
            .await
            .unwrap();
        let conversation = store.conversation(conversation.uuid).unwrap();

        let actor = Actor::Contact(colleague.identity());
        assert!(!guard.check_access(&actor, &conversation).await.unwrap());

        stores.organizations.add_member(org.id, colleague.id, false).await.unwrap();
        assert!(guard.check_access(&actor, &conversation).await.unwrap());

        // Sem cache: remover a associação revoga o acesso na próxima verificação
        stores.organizations.remove_member(org.id, colleague.id).await.unwrap();
        assert!(!guard.check_access(&actor, &conversation).await.unwrap());
    }

    #[tokio::test]
    async fn unshared_conversation_is_private_to_owner() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let guard = AccessGuard::new(&stores);
        let inbox = store.add_inbox(true, false);
        let owner = store.add_contact("owner@acme.com");
        let colleague = store.add_contact("colleague@acme.com");
        let org = stores.organizations.create("Acme", None).await.unwrap();
        stores.organizations.add_member(org.id, owner.id, false).await.unwrap();
        stores.organizations.add_member(org.id, colleague.id, false).await.unwrap();

        let conversation = store.add_conversation(owner.id, inbox);
        let actor = Actor::Contact(colleague.identity());
        assert!(!guard.check_access(&actor, &conversation).await.unwrap());
    }

    #[tokio::test]
    async fn agent_access_uses_live_assignment() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let guard = AccessGuard::new(&stores);
        let inbox = store.add_inbox(true, false);
        let contact = store.add_contact("c@x.com");
        let agent = store.add_agent(&[permission::CONVERSATIONS_READ_UNASSIGNED], &[]);
        let other = store.add_agent(&[], &[]);

        let conversation = store.add_conversation(contact.id, inbox);
        let actor = Actor::Agent(agent);
        assert!(guard.check_access(&actor, &conversation).await.unwrap());

        stores
            .conversations
            .save_assignment(conversation.uuid, Some(other.id), None)
            .await
            .unwrap();
        let err = guard.enforce(&actor, conversation.uuid).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[tokio::test]
    async fn team_scopes_use_agent_teams() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let guard = AccessGuard::new(&stores);
        let inbox = store.add_inbox(true, false);
        let contact = store.add_contact("c@x.com");
        let support = store.add_team("Support");
        let billing = store.add_team("Billing");
        let agent = store.add_agent(&[permission::CONVERSATIONS_READ_TEAM_ALL], &[support]);
        let actor = Actor::Agent(agent);

        let conversation = store.add_conversation(contact.id, inbox);
        stores
            .conversations
            .save_assignment(conversation.uuid, Some(999), Some(support))
            .await
            .unwrap();
        assert!(guard.enforce(&actor, conversation.uuid).await.is_ok());

        stores
            .conversations
            .save_assignment(conversation.uuid, None, Some(billing))
            .await
            .unwrap();
        assert!(guard.enforce(&actor, conversation.uuid).await.is_err());
    }

    #[tokio::test]
    async fn agent_without_read_permissions_is_denied() {
        let store = MemoryStore::new();
        let guard = AccessGuard::new(&store.stores());
        let inbox = store.add_inbox(true, false);
        let contact = store.add_contact("c@x.com");
        let conversation = store.add_conversation(contact.id, inbox);
        let actor = Actor::Agent(store.add_agent(&[permission::CONVERSATIONS_WRITE], &[]));

        assert!(!guard.check_access(&actor, &conversation).await.unwrap());
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found_before_permission() {
        let store = MemoryStore::new();
        let guard = AccessGuard::new(&store.stores());
        // Agente sem permissão alguma: mesmo assim o erro é NotFound
        let actor = Actor::Agent(store.add_agent(&[], &[]));
        let err = guard.enforce(&actor, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
