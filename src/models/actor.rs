// src/models/actor.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DbId;

// Mapeia o CREATE TYPE user_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Agent,
    Contact,
}

/// Agente com o conjunto de permissões e times já resolvidos pelo
/// subsistema de identidade (cargo -> permissões fica fora deste núcleo).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enabled: bool,
    pub permissions: Vec<String>,
    pub team_ids: Vec<DbId>,
}

impl Agent {
    pub fn has_permission(&self, slug: &str) -> bool {
        self.permissions.iter().any(|p| p == slug)
    }

    pub fn is_member_of(&self, team_id: DbId) -> bool {
        self.team_ids.contains(&team_id)
    }
}

/// Contato (cliente final). A associação com organização NÃO fica aqui:
/// ela é resolvida de novo a cada verificação de acesso.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactIdentity {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// Quem está executando a operação. Imutável durante a requisição.
#[derive(Debug, Clone)]
pub enum Actor {
    Agent(Agent),
    Contact(ContactIdentity),
}

impl Actor {
    pub fn id(&self) -> DbId {
        match self {
            Actor::Agent(agent) => agent.id,
            Actor::Contact(contact) => contact.id,
        }
    }

    pub fn user_type(&self) -> UserType {
        match self {
            Actor::Agent(_) => UserType::Agent,
            Actor::Contact(_) => UserType::Contact,
        }
    }

    pub fn reference(&self) -> ActorRef {
        ActorRef {
            id: self.id(),
            user_type: self.user_type(),
        }
    }
}

/// Referência leve ao ator, usada nos eventos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub id: DbId,
    pub user_type: UserType,
}
