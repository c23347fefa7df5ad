// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{actor::ContactIdentity, DbId};

// Representa um contato vindo da tabela 'users' (type = 'contact')
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "maria@acme.com")]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    // Caixa de entrada pela qual o contato chegou
    pub inbox_id: Option<DbId>,
    pub enabled: bool,
}

impl Contact {
    pub fn identity(&self) -> ContactIdentity {
        ContactIdentity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub inbox_id: Option<DbId>,
}

#[derive(Debug, Clone)]
pub struct ContactChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@acme.com")]
    pub email: String,

    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    #[schema(example = "Maria")]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    pub phone_number: Option<String>,

    // Adiciona a uma organização existente...
    pub organization_id: Option<DbId>,
    // ...ou cria uma nova com esse nome
    pub create_organization_name: Option<String>,
    #[serde(default)]
    pub share_tickets_by_default: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    pub phone_number: Option<String>,

    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockContactPayload {
    pub enabled: bool,
}
