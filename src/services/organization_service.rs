// src/services/organization_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{OrganizationStore, Stores, UserStore},
    models::{
        organization::{
            email_domain, AddMemberPayload, ContactOrganizationMembership, Membership, Organization,
            OrganizationDomain, OrganizationMember, OrganizationPayload,
        },
        DbId,
    },
};

/// Organização com que a conversa será compartilhada, se houver.
///
/// `explicit` (quando presente) substitui a preferência padrão da associação.
pub fn share_org_id(membership: Option<Membership>, explicit: Option<bool>) -> Option<DbId> {
    let membership = membership?;
    let share = explicit.unwrap_or(membership.share_tickets_by_default);
    share.then_some(membership.organization_id)
}

#[derive(Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationStore>,
    users: Arc<dyn UserStore>,
}

impl OrganizationService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            organizations: stores.organizations.clone(),
            users: stores.users.clone(),
        }
    }

    // --- COMPARTILHAMENTO ---

    pub async fn resolve_share_org_id(&self, contact_id: DbId, explicit: Option<bool>) -> Result<Option<DbId>, AppError> {
        let membership = self.organizations.membership_for_contact(contact_id).await?;
        Ok(share_org_id(membership, explicit))
    }

    /// Adiciona o contato a toda organização cujo domínio bate com o do e-mail.
    ///
    /// Enriquecimento de conveniência: erros são logados e engolidos.
    pub async fn sync_domain_memberships(&self, contact_id: DbId, email: &str) {
        let Some(domain) = email_domain(email) else {
            return;
        };

        let org_ids = match self.organizations.organization_ids_by_domain(&domain).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(contact_id, domain = %domain, error = %e, "Falha ao buscar organizações pelo domínio");
                return;
            }
        };

        for org_id in org_ids {
            match self.organizations.add_member(org_id, contact_id, false).await {
                Ok(()) => tracing::info!(contact_id, organization_id = org_id, "Contato associado pelo domínio do e-mail"),
                Err(e) => tracing::warn!(
                    contact_id,
                    organization_id = org_id,
                    error = %e,
                    "Falha na associação automática por domínio"
                ),
            }
        }
    }

    // --- CRUD ---

    pub async fn list(&self) -> Result<Vec<Organization>, AppError> {
        self.organizations.list().await
    }

    pub async fn get(&self, id: DbId) -> Result<Organization, AppError> {
        self.organizations
            .get(id)
            .await?
            .ok_or(AppError::NotFound("organization"))
    }

    pub async fn create(&self, payload: &OrganizationPayload) -> Result<Organization, AppError> {
        payload.validate()?;
        let org = self
            .organizations
            .create(payload.name.trim(), payload.description.as_deref())
            .await?;
        tracing::info!(organization_id = org.id, "Organização criada");
        Ok(org)
    }

    pub async fn update(&self, id: DbId, payload: &OrganizationPayload) -> Result<Organization, AppError> {
        payload.validate()?;
        self.organizations
            .update(id, payload.name.trim(), payload.description.as_deref())
            .await?
            .ok_or(AppError::NotFound("organization"))
    }

    pub async fn delete(&self, id: DbId) -> Result<(), AppError> {
        self.get(id).await?;
        self.organizations.delete(id).await?;
        tracing::info!(organization_id = id, "Organização excluída");
        Ok(())
    }

    // --- MEMBROS ---

    pub async fn members(&self, organization_id: DbId) -> Result<Vec<OrganizationMember>, AppError> {
        self.get(organization_id).await?;
        self.organizations.members(organization_id).await
    }

    pub async fn add_member(&self, organization_id: DbId, payload: &AddMemberPayload) -> Result<(), AppError> {
        payload.validate()?;
        self.get(organization_id).await?;
        self.users
            .get_contact(payload.contact_id)
            .await?
            .ok_or(AppError::NotFound("contact"))?;
        self.organizations
            .add_member(organization_id, payload.contact_id, payload.share_tickets_by_default)
            .await
    }

    pub async fn remove_member(&self, organization_id: DbId, contact_id: DbId) -> Result<(), AppError> {
        self.get(organization_id).await?;
        self.organizations.remove_member(organization_id, contact_id).await
    }

    pub async fn update_member_share(&self, organization_id: DbId, contact_id: DbId, share: bool) -> Result<(), AppError> {
        let updated = self
            .organizations
            .update_member_share(organization_id, contact_id, share)
            .await?;
        if !updated {
            return Err(AppError::NotFound("member"));
        }
        Ok(())
    }

    pub async fn memberships_for_contact(&self, contact_id: DbId) -> Result<Vec<ContactOrganizationMembership>, AppError> {
        self.organizations.memberships_for_contact(contact_id).await
    }

    // --- DOMÍNIOS ---

    pub async fn domains(&self, organization_id: DbId) -> Result<Vec<OrganizationDomain>, AppError> {
        self.get(organization_id).await?;
        self.organizations.domains(organization_id).await
    }

    pub async fn add_domain(&self, organization_id: DbId, domain: &str) -> Result<OrganizationDomain, AppError> {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return Err(AppError::input_named("globals.empty", "`domain`"));
        }
        self.get(organization_id).await?;
        self.organizations.add_domain(organization_id, &domain).await
    }

    pub async fn remove_domain(&self, organization_id: DbId, domain: &str) -> Result<(), AppError> {
        self.organizations
            .remove_domain(organization_id, &domain.trim().to_lowercase())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::error::ErrorKind, db::memory::MemoryStore};

    fn membership(share: bool) -> Option<Membership> {
        Some(Membership {
            organization_id: 42,
            share_tickets_by_default: share,
        })
    }

    #[test]
    fn no_membership_never_shares() {
        assert_eq!(share_org_id(None, Some(true)), None);
    }

    #[test]
    fn explicit_choice_overrides_default() {
        assert_eq!(share_org_id(membership(false), Some(true)), Some(42));
        assert_eq!(share_org_id(membership(true), Some(false)), None);
    }

    #[test]
    fn default_preference_applies_without_override() {
        assert_eq!(share_org_id(membership(true), None), Some(42));
        assert_eq!(share_org_id(membership(false), None), None);
    }

    #[tokio::test]
    async fn email_domain_adds_membership_without_sharing() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let service = OrganizationService::new(&stores);
        let acme = service
            .create(&OrganizationPayload {
                name: "Acme".into(),
                description: None,
            })
            .await
            .unwrap();
        service.add_domain(acme.id, " ACME.com ").await.unwrap();

        let contact = store.add_contact("a@acme.com");
        service.sync_domain_memberships(contact.id, "a@ACME.COM").await;

        let membership = stores.organizations.membership_for_contact(contact.id).await.unwrap().unwrap();
        assert_eq!(membership.organization_id, acme.id);
        assert!(!membership.share_tickets_by_default);
    }

    #[tokio::test]
    async fn domain_lookup_failure_is_swallowed() {
        let store = MemoryStore::new();
        let stores = store.stores();
        let service = OrganizationService::new(&stores);
        let contact = store.add_contact("a@acme.com");
        store.fail_domain_lookups(true);

        service.sync_domain_memberships(contact.id, "a@acme.com").await;
        assert!(stores.organizations.membership_for_contact(contact.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_domain_is_rejected() {
        let store = MemoryStore::new();
        let service = OrganizationService::new(&store.stores());
        let err = service.add_domain(1, "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[tokio::test]
    async fn adding_unknown_contact_is_not_found() {
        let store = MemoryStore::new();
        let service = OrganizationService::new(&store.stores());
        let org = service
            .create(&OrganizationPayload {
                name: "Acme".into(),
                description: Some("Clientes".into()),
            })
            .await
            .unwrap();
        let err = service
            .add_member(
                org.id,
                &AddMemberPayload {
                    contact_id: 999_999,
                    share_tickets_by_default: false,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn updating_share_of_non_member_is_not_found() {
        let store = MemoryStore::new();
        let service = OrganizationService::new(&store.stores());
        let err = service.update_member_share(1, 2, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
