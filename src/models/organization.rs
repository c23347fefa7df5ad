// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::DbId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(example = "Acme")]
    pub name: String,
    pub description: Option<String>,
}

/// Membro de uma organização, já com os dados do contato.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub organization_id: DbId,
    pub contact_id: DbId,
    pub share_tickets_by_default: bool,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_email: Option<String>,
}

/// Associação usada nas regras de acesso e na criação de conversas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub organization_id: DbId,
    pub share_tickets_by_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactOrganizationMembership {
    pub organization_id: DbId,
    pub organization_name: String,
    pub share_tickets_by_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDomain {
    pub id: DbId,
    pub created_at: DateTime<Utc>,
    pub organization_id: DbId,
    #[schema(example = "acme.com")]
    pub domain: String,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPayload {
    #[validate(length(min = 1, max = 140, message = "O nome deve ter entre 1 e 140 caracteres"))]
    #[schema(example = "Acme")]
    pub name: String,

    #[validate(length(max = 300, message = "A descrição deve ter no máximo 300 caracteres"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    #[validate(range(min = 1, message = "Contato inválido"))]
    pub contact_id: DbId,
    #[serde(default)]
    pub share_tickets_by_default: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberSharePayload {
    pub share_tickets_by_default: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainPayload {
    #[schema(example = "acme.com")]
    pub domain: String,
}

/// Extrai o domínio depois do último '@', em minúsculas. `None` se não houver domínio.
pub fn email_domain(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    let at = email.rfind('@')?;
    let domain = &email[at + 1..];
    (!domain.is_empty()).then(|| domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::email_domain;

    #[test]
    fn domain_is_taken_after_the_last_at() {
        assert_eq!(email_domain("A@Acme.COM").as_deref(), Some("acme.com"));
        assert_eq!(email_domain("\"odd@name\"@sub.acme.com").as_deref(), Some("sub.acme.com"));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("trailing@"), None);
    }
}
