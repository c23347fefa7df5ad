// src/models/conversation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{actor::UserType, DbId};

// --- CONVERSA ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: DbId,
    pub uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub contact_id: DbId,
    pub inbox_id: DbId,

    pub assigned_user_id: Option<DbId>,
    pub assigned_team_id: Option<DbId>,

    pub status_id: DbId,
    pub snoozed_until: Option<DateTime<Utc>>,

    // Só é preenchido quando a conversa foi compartilhada com a organização
    pub organization_id: Option<DbId>,

    #[schema(example = "Não consigo acessar minha conta")]
    pub subject: Option<String>,

    #[schema(example = json!(["billing", "vip"]))]
    pub tags: Vec<String>,

    #[schema(value_type = Object)]
    pub custom_attributes: Value,
}

/// Dados para inserir uma conversa nova.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub contact_id: DbId,
    pub inbox_id: DbId,
    pub subject: Option<String>,
    pub organization_id: Option<DbId>,
}

// --- MENSAGENS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "message_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: DbId,
    pub uuid: Uuid,
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub sender_type: UserType,
    pub direction: MessageDirection,
    pub content: String,
    pub private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub sender_type: UserType,
    pub direction: MessageDirection,
    pub content: String,
    pub private: bool,
}

impl NewMessage {
    pub fn from_contact(conversation_id: DbId, contact_id: DbId, content: &str) -> Self {
        Self {
            conversation_id,
            sender_id: contact_id,
            sender_type: UserType::Contact,
            direction: MessageDirection::Incoming,
            content: content.to_string(),
            private: false,
        }
    }

    pub fn agent_reply(conversation_id: DbId, agent_id: DbId, content: &str) -> Self {
        Self {
            conversation_id,
            sender_id: agent_id,
            sender_type: UserType::Agent,
            direction: MessageDirection::Outgoing,
            content: content.to_string(),
            private: false,
        }
    }
}

/// Quem abriu a conversa criada pelo agente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Initiator {
    Agent,
    Contact,
}

impl Initiator {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "agent" => Some(Initiator::Agent),
            "contact" => Some(Initiator::Contact),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationPayload {
    #[validate(range(min = 1, message = "A caixa de entrada é obrigatória"))]
    pub inbox_id: DbId,

    // Atribuições opcionais: o time é aplicado antes do agente
    pub agent_id: Option<DbId>,
    pub team_id: Option<DbId>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@acme.com")]
    pub contact_email: String,

    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,

    pub subject: Option<String>,

    #[validate(length(min = 1, message = "O conteúdo é obrigatório"))]
    pub content: String,

    #[schema(example = "agent")]
    pub initiator: String,

    // Quando presente, substitui a preferência padrão do contato
    pub share_with_organization: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssigneePayload {
    pub assignee_id: DbId,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub shared_with_organization: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagsPayload {
    #[schema(example = json!(["billing", "vip"]))]
    pub tags: Vec<String>,
}

// --- PORTAL ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalCreateConversationPayload {
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "O conteúdo é obrigatório"))]
    pub content: String,
    pub share_with_organization: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PortalMessagePayload {
    #[validate(length(min = 1, message = "A mensagem é obrigatória"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PortalClosePayload {
    #[validate(length(min = 1, message = "O comentário é obrigatório"))]
    pub comment: String,
}

/// Normaliza a lista de tags: remove espaços, vazias e repetidas (mantém a ordem).
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|existing| existing == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![" vip".to_string(), "".into(), "billing".into(), "vip ".into()];
        assert_eq!(normalize_tags(&tags), vec!["vip", "billing"]);
    }

    #[test]
    fn initiator_accepts_only_known_values() {
        assert_eq!(Initiator::parse("agent"), Some(Initiator::Agent));
        assert_eq!(Initiator::parse("bot"), None);
    }
}
