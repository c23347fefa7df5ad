// src/db/organization_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        organization::{
            ContactOrganizationMembership, Membership, Organization, OrganizationDomain,
            OrganizationMember,
        },
        DbId,
    },
};

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Organization>, AppError>;
    async fn get(&self, id: DbId) -> Result<Option<Organization>, AppError>;
    async fn create(&self, name: &str, description: Option<&str>) -> Result<Organization, AppError>;
    async fn update(&self, id: DbId, name: &str, description: Option<&str>) -> Result<Option<Organization>, AppError>;
    async fn delete(&self, id: DbId) -> Result<(), AppError>;

    /// Associação atual do contato (a mais antiga, se houver várias).
    async fn membership_for_contact(&self, contact_id: DbId) -> Result<Option<Membership>, AppError>;
    async fn memberships_for_contact(&self, contact_id: DbId) -> Result<Vec<ContactOrganizationMembership>, AppError>;
    async fn members(&self, organization_id: DbId) -> Result<Vec<OrganizationMember>, AppError>;
    // Se o contato já for membro, mantém a associação existente
    async fn add_member(&self, organization_id: DbId, contact_id: DbId, share_tickets_by_default: bool) -> Result<(), AppError>;
    async fn remove_member(&self, organization_id: DbId, contact_id: DbId) -> Result<(), AppError>;
    async fn update_member_share(
        &self,
        organization_id: DbId,
        contact_id: DbId,
        share_tickets_by_default: bool,
    ) -> Result<bool, AppError>;

    async fn domains(&self, organization_id: DbId) -> Result<Vec<OrganizationDomain>, AppError>;
    async fn add_domain(&self, organization_id: DbId, domain: &str) -> Result<OrganizationDomain, AppError>;
    async fn remove_domain(&self, organization_id: DbId, domain: &str) -> Result<(), AppError>;
    async fn organization_ids_by_domain(&self, domain: &str) -> Result<Vec<DbId>, AppError>;
}

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.created_at, m.updated_at, m.organization_id, m.contact_id,
           m.share_tickets_by_default,
           u.first_name AS contact_first_name,
           u.last_name AS contact_last_name,
           u.email AS contact_email
    FROM organization_members m
    JOIN users u ON u.id = m.contact_id
"#;

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn list(&self) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT id, created_at, updated_at, name, description FROM organizations ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orgs)
    }

    async fn get(&self, id: DbId) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT id, created_at, updated_at, name, description FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(org)
    }

    async fn create(&self, name: &str, description: Option<&str>) -> Result<Organization, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, description)
            VALUES ($1, $2)
            RETURNING id, created_at, updated_at, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(org)
    }

    async fn update(&self, id: DbId, name: &str, description: Option<&str>) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, created_at, updated_at, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(org)
    }

    async fn delete(&self, id: DbId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn membership_for_contact(&self, contact_id: DbId) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT organization_id, share_tickets_by_default
            FROM organization_members
            WHERE contact_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    async fn memberships_for_contact(&self, contact_id: DbId) -> Result<Vec<ContactOrganizationMembership>, AppError> {
        let list = sqlx::query_as::<_, ContactOrganizationMembership>(
            r#"
            SELECT m.organization_id, o.name AS organization_name, m.share_tickets_by_default
            FROM organization_members m
            JOIN organizations o ON o.id = m.organization_id
            WHERE m.contact_id = $1
            ORDER BY o.name ASC
            "#,
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn members(&self, organization_id: DbId) -> Result<Vec<OrganizationMember>, AppError> {
        let sql = format!("{} WHERE m.organization_id = $1 ORDER BY u.first_name ASC", MEMBER_SELECT);
        let members = sqlx::query_as::<_, OrganizationMember>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn add_member(&self, organization_id: DbId, contact_id: DbId, share_tickets_by_default: bool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, contact_id, share_tickets_by_default)
            VALUES ($1, $2, $3)
            ON CONFLICT (organization_id, contact_id) DO NOTHING
            "#,
        )
        .bind(organization_id)
        .bind(contact_id)
        .bind(share_tickets_by_default)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_member(&self, organization_id: DbId, contact_id: DbId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND contact_id = $2")
            .bind(organization_id)
            .bind(contact_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_member_share(
        &self,
        organization_id: DbId,
        contact_id: DbId,
        share_tickets_by_default: bool,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE organization_members
            SET share_tickets_by_default = $3, updated_at = NOW()
            WHERE organization_id = $1 AND contact_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(contact_id)
        .bind(share_tickets_by_default)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn domains(&self, organization_id: DbId) -> Result<Vec<OrganizationDomain>, AppError> {
        let list = sqlx::query_as::<_, OrganizationDomain>(
            r#"
            SELECT id, created_at, organization_id, domain
            FROM organization_domains
            WHERE organization_id = $1
            ORDER BY domain ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn add_domain(&self, organization_id: DbId, domain: &str) -> Result<OrganizationDomain, AppError> {
        // Reenviar um domínio já cadastrado devolve o registro existente
        let created = sqlx::query_as::<_, OrganizationDomain>(
            r#"
            INSERT INTO organization_domains (organization_id, domain)
            VALUES ($1, $2)
            ON CONFLICT (organization_id, domain) DO UPDATE SET domain = EXCLUDED.domain
            RETURNING id, created_at, organization_id, domain
            "#,
        )
        .bind(organization_id)
        .bind(domain)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn remove_domain(&self, organization_id: DbId, domain: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM organization_domains WHERE organization_id = $1 AND domain = $2")
            .bind(organization_id)
            .bind(domain)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn organization_ids_by_domain(&self, domain: &str) -> Result<Vec<DbId>, AppError> {
        let ids = sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT organization_id FROM organization_domains WHERE domain = LOWER($1)",
        )
        .bind(domain)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
