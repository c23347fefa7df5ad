// src/db/memory.rs

// Implementação em memória de todos os stores, usada nos testes dos serviços.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ConversationStore, InboxStore, OrganizationStore, SettingsStore, StatusStore, Stores,
        TeamStore, UserStore, ViewStore,
    },
    models::{
        actor::{Agent, UserType},
        auth::Credentials,
        contact::{Contact, ContactChanges, NewContact},
        conversation::{Conversation, Message, NewConversation, NewMessage},
        inbox::Inbox,
        organization::{
            ContactOrganizationMembership, Membership, Organization, OrganizationDomain,
            OrganizationMember,
        },
        pagination::{OrderBy, Pagination, SortOrder},
        scope::ConversationQuery,
        settings::AppSettings,
        status::Status,
        team::Team,
        view::{View, ViewVisibility},
        DbId,
    },
};

#[derive(Clone)]
struct MemberRow {
    id: DbId,
    created_at: DateTime<Utc>,
    organization_id: DbId,
    contact_id: DbId,
    share_tickets_by_default: bool,
}

struct ResetTokenRow {
    token: String,
    user_id: DbId,
    expires_at: DateTime<Utc>,
    used: bool,
}

#[derive(Default)]
struct State {
    next_id: DbId,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    mentions: Vec<(DbId, DbId)>,
    agents: HashMap<DbId, Agent>,
    contacts: HashMap<DbId, Contact>,
    passwords: HashMap<DbId, String>,
    reset_tokens: Vec<ResetTokenRow>,
    teams: HashMap<DbId, Team>,
    team_members: Vec<(DbId, DbId)>,
    statuses: Vec<Status>,
    views: HashMap<DbId, View>,
    inboxes: HashMap<DbId, Inbox>,
    settings: AppSettings,
    organizations: Vec<Organization>,
    members: Vec<MemberRow>,
    domains: Vec<OrganizationDomain>,
    fail_message_inserts: bool,
    fail_domain_lookups: bool,
}

impl State {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn conversation_mut(&mut self, uuid: Uuid) -> Result<&mut Conversation, AppError> {
        self.conversations
            .iter_mut()
            .find(|c| c.uuid == uuid)
            .ok_or(AppError::NotFound("conversation"))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            // IDs acima dos status padrão, como no BIGSERIAL semeado
            state.next_id = 100;
            for (id, name) in [(1, "Open"), (2, "Snoozed"), (3, "Resolved"), (4, "Closed")] {
                state.statuses.push(
                    Status {
                        id,
                        created_at: Utc::now(),
                        name: name.to_string(),
                        is_default: false,
                    }
                    .with_default_flag(),
                );
            }
        }
        Arc::new(store)
    }

    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            conversations: self.clone(),
            organizations: self.clone(),
            users: self.clone(),
            teams: self.clone(),
            statuses: self.clone(),
            views: self.clone(),
            inboxes: self.clone(),
            settings: self.clone(),
        }
    }

    // --- helpers de montagem dos cenários ---

    pub fn add_agent(&self, permissions: &[&str], team_ids: &[DbId]) -> Agent {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let agent = Agent {
            id,
            first_name: format!("Agent{}", id),
            last_name: "Test".into(),
            email: format!("agent{}@helpdesk.test", id),
            enabled: true,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            team_ids: team_ids.to_vec(),
        };
        for team in team_ids {
            state.team_members.push((*team, id));
        }
        state.agents.insert(id, agent.clone());
        agent
    }

    pub fn add_team(&self, name: &str) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        state.teams.insert(
            id,
            Team {
                id,
                created_at: Utc::now(),
                name: name.into(),
            },
        );
        id
    }

    pub fn add_inbox(&self, enabled: bool, csat_enabled: bool) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        state.inboxes.insert(
            id,
            Inbox {
                id,
                created_at: Utc::now(),
                name: format!("Inbox {}", id),
                enabled,
                csat_enabled,
                from_address: Some("support@helpdesk.test".into()),
            },
        );
        id
    }

    pub fn add_contact(&self, email: &str) -> Contact {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let contact = Contact {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            first_name: "Contact".into(),
            last_name: format!("{}", id),
            email: Some(email.to_lowercase()),
            phone_number: None,
            inbox_id: None,
            enabled: true,
        };
        state.contacts.insert(id, contact.clone());
        contact
    }

    pub fn add_view(&self, visibility: ViewVisibility, user_id: Option<DbId>, team_id: Option<DbId>, filters: Value) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        state.views.insert(
            id,
            View {
                id,
                name: format!("View {}", id),
                user_id,
                team_id,
                visibility,
                filters,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn add_conversation(&self, contact_id: DbId, inbox_id: DbId) -> Conversation {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let conversation = Conversation {
            id,
            uuid: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            contact_id,
            inbox_id,
            assigned_user_id: None,
            assigned_team_id: None,
            status_id: 1,
            snoozed_until: None,
            organization_id: None,
            subject: None,
            tags: vec![],
            custom_attributes: json!({}),
        };
        state.conversations.push(conversation.clone());
        conversation
    }

    pub fn mention(&self, conversation_id: DbId, user_id: DbId) {
        self.state.lock().unwrap().mentions.push((conversation_id, user_id));
    }

    pub fn set_password_hash(&self, user_id: DbId, hash: &str) {
        self.state.lock().unwrap().passwords.insert(user_id, hash.to_string());
    }

    pub fn set_settings(&self, settings: AppSettings) {
        self.state.lock().unwrap().settings = settings;
    }

    pub fn fail_message_inserts(&self, fail: bool) {
        self.state.lock().unwrap().fail_message_inserts = fail;
    }

    pub fn fail_domain_lookups(&self, fail: bool) {
        self.state.lock().unwrap().fail_domain_lookups = fail;
    }

    pub fn conversation(&self, uuid: Uuid) -> Option<Conversation> {
        self.state
            .lock()
            .unwrap()
            .conversations
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned()
    }

    pub fn conversation_count(&self) -> usize {
        self.state.lock().unwrap().conversations.len()
    }

    pub fn messages_of(&self, conversation_id: DbId) -> Vec<Message> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub fn latest_reset_token(&self, user_id: DbId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .reset_tokens
            .iter()
            .rev()
            .find(|t| t.user_id == user_id)
            .map(|t| t.token.clone())
    }

    pub fn password_hash(&self, user_id: DbId) -> Option<String> {
        self.state.lock().unwrap().passwords.get(&user_id).cloned()
    }

    pub fn expire_reset_tokens(&self) {
        let mut state = self.state.lock().unwrap();
        for token in state.reset_tokens.iter_mut() {
            token.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }
}

fn paginate(mut items: Vec<Conversation>, order_by: OrderBy, order: SortOrder, pagination: Pagination) -> (Vec<Conversation>, i64) {
    items.sort_by(|a, b| {
        let (ka, kb) = match order_by {
            OrderBy::CreatedAt => (a.created_at, b.created_at),
            OrderBy::UpdatedAt => (a.updated_at, b.updated_at),
        };
        let ord = ka.cmp(&kb).then(a.id.cmp(&b.id));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.page_size as usize)
        .collect();
    (page, total)
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Conversation>, AppError> {
        Ok(self.conversation(uuid))
    }

    async fn create(&self, new: &NewConversation) -> Result<Conversation, AppError> {
        let created = self.add_conversation(new.contact_id, new.inbox_id);
        let mut state = self.state.lock().unwrap();
        let conversation = state.conversation_mut(created.uuid)?;
        conversation.subject = new.subject.clone();
        conversation.organization_id = new.organization_id;
        Ok(conversation.clone())
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), AppError> {
        self.state.lock().unwrap().conversations.retain(|c| c.uuid != uuid);
        Ok(())
    }

    async fn save_assignment(&self, uuid: Uuid, user_id: Option<DbId>, team_id: Option<DbId>) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let conversation = state.conversation_mut(uuid)?;
        conversation.assigned_user_id = user_id;
        conversation.assigned_team_id = team_id;
        conversation.updated_at = Utc::now();
        Ok(())
    }

    async fn save_status(&self, uuid: Uuid, status_id: DbId, snoozed_until: Option<DateTime<Utc>>) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let conversation = state.conversation_mut(uuid)?;
        conversation.status_id = status_id;
        conversation.snoozed_until = snoozed_until;
        conversation.updated_at = Utc::now();
        Ok(())
    }

    async fn update_organization_id(&self, uuid: Uuid, organization_id: Option<DbId>) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.conversation_mut(uuid)?.organization_id = organization_id;
        Ok(())
    }

    async fn set_tags(&self, uuid: Uuid, tags: &[String]) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.conversation_mut(uuid)?.tags = tags.to_vec();
        Ok(())
    }

    async fn update_custom_attributes(&self, uuid: Uuid, attributes: &Value) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.conversation_mut(uuid)?.custom_attributes = attributes.clone();
        Ok(())
    }

    async fn list(&self, query: &ConversationQuery) -> Result<(Vec<Conversation>, i64), AppError> {
        let state = self.state.lock().unwrap();
        let matching: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| {
                let mentioned: Vec<DbId> = state
                    .mentions
                    .iter()
                    .filter(|(conv, _)| *conv == c.id)
                    .map(|(_, user)| *user)
                    .collect();
                query.matches(c, &mentioned)
            })
            .cloned()
            .collect();
        Ok(paginate(matching, query.order_by, query.order, query.pagination))
    }

    async fn list_for_contact(
        &self,
        contact_id: DbId,
        organization_id: Option<DbId>,
        pagination: Pagination,
    ) -> Result<(Vec<Conversation>, i64), AppError> {
        let state = self.state.lock().unwrap();
        let matching: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| c.contact_id == contact_id || (organization_id.is_some() && c.organization_id == organization_id))
            .cloned()
            .collect();
        Ok(paginate(matching, OrderBy::UpdatedAt, SortOrder::Desc, pagination))
    }

    async fn mentioned_user_ids(&self, conversation_id: DbId) -> Result<Vec<DbId>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .mentions
            .iter()
            .filter(|(conv, _)| *conv == conversation_id)
            .map(|(_, user)| *user)
            .collect())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_message_inserts {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada ao gravar mensagem")));
        }
        let id = state.id();
        let created = Message {
            id,
            uuid: Uuid::new_v4(),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            sender_type: message.sender_type,
            direction: message.direction,
            content: message.content.clone(),
            private: message.private,
            created_at: Utc::now(),
        };
        state.messages.push(created.clone());
        Ok(created)
    }

    async fn list_messages(&self, conversation_id: DbId, include_private: bool) -> Result<Vec<Message>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && (include_private || !m.private))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Organization>, AppError> {
        Ok(self.state.lock().unwrap().organizations.clone())
    }

    async fn get(&self, id: DbId) -> Result<Option<Organization>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn create(&self, name: &str, description: Option<&str>) -> Result<Organization, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let org = Organization {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        state.organizations.push(org.clone());
        Ok(org)
    }

    async fn update(&self, id: DbId, name: &str, description: Option<&str>) -> Result<Option<Organization>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.organizations.iter_mut().find(|o| o.id == id).map(|org| {
            org.name = name.to_string();
            org.description = description.map(str::to_string);
            org.updated_at = Utc::now();
            org.clone()
        }))
    }

    async fn delete(&self, id: DbId) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.organizations.retain(|o| o.id != id);
        state.members.retain(|m| m.organization_id != id);
        state.domains.retain(|d| d.organization_id != id);
        for conversation in state.conversations.iter_mut() {
            if conversation.organization_id == Some(id) {
                conversation.organization_id = None;
            }
        }
        Ok(())
    }

    async fn membership_for_contact(&self, contact_id: DbId) -> Result<Option<Membership>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .iter()
            .filter(|m| m.contact_id == contact_id)
            .min_by_key(|m| (m.created_at, m.id))
            .map(|m| Membership {
                organization_id: m.organization_id,
                share_tickets_by_default: m.share_tickets_by_default,
            }))
    }

    async fn memberships_for_contact(&self, contact_id: DbId) -> Result<Vec<ContactOrganizationMembership>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .iter()
            .filter(|m| m.contact_id == contact_id)
            .filter_map(|m| {
                let org = state.organizations.iter().find(|o| o.id == m.organization_id)?;
                Some(ContactOrganizationMembership {
                    organization_id: org.id,
                    organization_name: org.name.clone(),
                    share_tickets_by_default: m.share_tickets_by_default,
                })
            })
            .collect())
    }

    async fn members(&self, organization_id: DbId) -> Result<Vec<OrganizationMember>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .filter_map(|m| {
                let contact = state.contacts.get(&m.contact_id)?;
                Some(OrganizationMember {
                    id: m.id,
                    created_at: m.created_at,
                    updated_at: m.created_at,
                    organization_id: m.organization_id,
                    contact_id: m.contact_id,
                    share_tickets_by_default: m.share_tickets_by_default,
                    contact_first_name: contact.first_name.clone(),
                    contact_last_name: contact.last_name.clone(),
                    contact_email: contact.email.clone(),
                })
            })
            .collect())
    }

    async fn add_member(&self, organization_id: DbId, contact_id: DbId, share_tickets_by_default: bool) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let exists = state
            .members
            .iter()
            .any(|m| m.organization_id == organization_id && m.contact_id == contact_id);
        if !exists {
            let id = state.id();
            state.members.push(MemberRow {
                id,
                created_at: Utc::now(),
                organization_id,
                contact_id,
                share_tickets_by_default,
            });
        }
        Ok(())
    }

    async fn remove_member(&self, organization_id: DbId, contact_id: DbId) -> Result<(), AppError> {
        self.state
            .lock()
            .unwrap()
            .members
            .retain(|m| !(m.organization_id == organization_id && m.contact_id == contact_id));
        Ok(())
    }

    async fn update_member_share(&self, organization_id: DbId, contact_id: DbId, share_tickets_by_default: bool) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        match state
            .members
            .iter_mut()
            .find(|m| m.organization_id == organization_id && m.contact_id == contact_id)
        {
            Some(member) => {
                member.share_tickets_by_default = share_tickets_by_default;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn domains(&self, organization_id: DbId) -> Result<Vec<OrganizationDomain>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .domains
            .iter()
            .filter(|d| d.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn add_domain(&self, organization_id: DbId, domain: &str) -> Result<OrganizationDomain, AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .domains
            .iter()
            .find(|d| d.organization_id == organization_id && d.domain == domain)
        {
            return Ok(existing.clone());
        }
        let id = state.id();
        let created = OrganizationDomain {
            id,
            created_at: Utc::now(),
            organization_id,
            domain: domain.to_string(),
        };
        state.domains.push(created.clone());
        Ok(created)
    }

    async fn remove_domain(&self, organization_id: DbId, domain: &str) -> Result<(), AppError> {
        self.state
            .lock()
            .unwrap()
            .domains
            .retain(|d| !(d.organization_id == organization_id && d.domain == domain));
        Ok(())
    }

    async fn organization_ids_by_domain(&self, domain: &str) -> Result<Vec<DbId>, AppError> {
        let state = self.state.lock().unwrap();
        if state.fail_domain_lookups {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada na busca de domínios")));
        }
        let domain = domain.to_lowercase();
        let mut ids: Vec<DbId> = state
            .domains
            .iter()
            .filter(|d| d.domain == domain)
            .map(|d| d.organization_id)
            .collect();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_agent(&self, id: DbId) -> Result<Option<Agent>, AppError> {
        Ok(self.state.lock().unwrap().agents.get(&id).cloned())
    }

    async fn get_contact(&self, id: DbId) -> Result<Option<Contact>, AppError> {
        Ok(self.state.lock().unwrap().contacts.get(&id).cloned())
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        let email = email.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .contacts
            .values()
            .find(|c| c.email.as_deref().map(str::to_lowercase).as_deref() == Some(email.as_str()))
            .cloned())
    }

    async fn credentials_by_email(&self, email: &str, user_type: UserType) -> Result<Option<Credentials>, AppError> {
        let email = email.to_lowercase();
        let state = self.state.lock().unwrap();
        let found = match user_type {
            UserType::Agent => state
                .agents
                .values()
                .find(|a| a.email.to_lowercase() == email)
                .map(|a| (a.id, a.enabled)),
            UserType::Contact => state
                .contacts
                .values()
                .find(|c| c.email.as_deref().map(str::to_lowercase).as_deref() == Some(email.as_str()))
                .map(|c| (c.id, c.enabled)),
        };
        Ok(found.map(|(id, enabled)| Credentials {
            id,
            user_type,
            enabled,
            password_hash: state.passwords.get(&id).cloned(),
        }))
    }

    async fn create_contact(&self, new: &NewContact) -> Result<Contact, AppError> {
        if self.find_contact_by_email(&new.email).await?.is_some() {
            return Err(AppError::input("contact.alreadyExistsWithEmail"));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let contact = Contact {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: Some(new.email.clone()),
            phone_number: new.phone_number.clone(),
            inbox_id: new.inbox_id,
            enabled: true,
        };
        state.contacts.insert(id, contact.clone());
        Ok(contact)
    }

    async fn update_contact(&self, id: DbId, changes: &ContactChanges) -> Result<Option<Contact>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.contacts.get_mut(&id).map(|contact| {
            contact.first_name = changes.first_name.clone();
            contact.last_name = changes.last_name.clone();
            contact.email = Some(changes.email.clone());
            contact.phone_number = changes.phone_number.clone();
            contact.updated_at = Utc::now();
            contact.clone()
        }))
    }

    async fn set_enabled(&self, id: DbId, enabled: bool) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(contact) = state.contacts.get_mut(&id) {
            contact.enabled = enabled;
            return Ok(true);
        }
        if let Some(agent) = state.agents.get_mut(&id) {
            agent.enabled = enabled;
            return Ok(true);
        }
        Ok(false)
    }

    async fn set_password(&self, id: DbId, password_hash: &str) -> Result<(), AppError> {
        self.set_password_hash(id, password_hash);
        Ok(())
    }

    async fn save_reset_token(&self, user_id: DbId, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        self.state.lock().unwrap().reset_tokens.push(ResetTokenRow {
            token: token.to_string(),
            user_id,
            expires_at,
            used: false,
        });
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<DbId>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        Ok(state
            .reset_tokens
            .iter_mut()
            .find(|t| t.token == token && !t.used && t.expires_at > now)
            .map(|t| {
                t.used = true;
                t.user_id
            }))
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn get(&self, id: DbId) -> Result<Option<Team>, AppError> {
        Ok(self.state.lock().unwrap().teams.get(&id).cloned())
    }

    async fn user_belongs_to_team(&self, team_id: DbId, user_id: DbId) -> Result<bool, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.team_members.contains(&(team_id, user_id)))
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn get(&self, id: DbId) -> Result<Option<Status>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Status>, AppError> {
        Ok(self.state.lock().unwrap().statuses.clone())
    }

    async fn create(&self, name: &str) -> Result<Status, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let status = Status {
            id,
            created_at: Utc::now(),
            name: name.to_string(),
            is_default: false,
        }
        .with_default_flag();
        state.statuses.push(status.clone());
        Ok(status)
    }

    async fn rename(&self, id: DbId, name: &str) -> Result<Option<Status>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.statuses.iter_mut().find(|s| s.id == id).map(|s| {
            s.name = name.to_string();
            s.clone()
        }))
    }

    async fn delete(&self, id: DbId) -> Result<(), AppError> {
        self.state.lock().unwrap().statuses.retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl ViewStore for MemoryStore {
    async fn get(&self, id: DbId) -> Result<Option<View>, AppError> {
        Ok(self.state.lock().unwrap().views.get(&id).cloned())
    }
}

#[async_trait]
impl InboxStore for MemoryStore {
    async fn get(&self, id: DbId) -> Result<Option<Inbox>, AppError> {
        Ok(self.state.lock().unwrap().inboxes.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Inbox>, AppError> {
        let state = self.state.lock().unwrap();
        let mut inboxes: Vec<Inbox> = state.inboxes.values().cloned().collect();
        inboxes.sort_by_key(|i| i.id);
        Ok(inboxes)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<AppSettings, AppError> {
        Ok(self.state.lock().unwrap().settings)
    }

    async fn save(&self, settings: &AppSettings) -> Result<(), AppError> {
        self.state.lock().unwrap().settings = *settings;
        Ok(())
    }
}
