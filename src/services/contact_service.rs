// src/services/contact_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{InboxStore, OrganizationStore, Stores, UserStore},
    models::{
        contact::{Contact, ContactChanges, CreateContactPayload, NewContact, UpdateContactPayload},
        organization::ContactOrganizationMembership,
        settings::AppSettings,
        DbId,
    },
    services::{
        auth::{hash_password, AuthService},
        organization_service::OrganizationService,
    },
};

#[derive(Clone)]
pub struct ContactService {
    users: Arc<dyn UserStore>,
    inboxes: Arc<dyn InboxStore>,
    organizations: Arc<dyn OrganizationStore>,
    organization_service: OrganizationService,
    auth: AuthService,
}

impl ContactService {
    pub fn new(stores: &Stores, organization_service: OrganizationService, auth: AuthService) -> Self {
        Self {
            users: stores.users.clone(),
            inboxes: stores.inboxes.clone(),
            organizations: stores.organizations.clone(),
            organization_service,
            auth,
        }
    }

    // Caixa do portal quando configurada; senão a primeira cadastrada
    async fn default_inbox(&self, settings: &AppSettings) -> Result<Option<DbId>, AppError> {
        if let Some(id) = settings.portal_inbox() {
            return Ok(Some(id));
        }
        Ok(self.inboxes.list().await?.first().map(|inbox| inbox.id))
    }

    /// Cria o contato e, opcionalmente, já o associa a uma organização
    /// (existente ou criada na hora). Depois aplica a associação por domínio.
    pub async fn create(&self, payload: &CreateContactPayload, settings: &AppSettings) -> Result<Contact, AppError> {
        payload.validate()?;
        let email = payload.email.trim().to_lowercase();

        if self.users.find_contact_by_email(&email).await?.is_some() {
            return Err(AppError::input("contact.alreadyExistsWithEmail"));
        }

        // O nome de uma nova organização tem precedência sobre o ID.
        // A existente é conferida antes de gravar o contato.
        let new_organization = payload
            .create_organization_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let existing_organization = match (new_organization, payload.organization_id) {
            (None, Some(id)) => Some(
                self.organizations
                    .get(id)
                    .await?
                    .ok_or(AppError::NotFound("organization"))?
                    .id,
            ),
            _ => None,
        };

        let contact = self
            .users
            .create_contact(&NewContact {
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                email: email.clone(),
                phone_number: payload.phone_number.clone(),
                inbox_id: self.default_inbox(settings).await?,
            })
            .await?;

        let organization_id = match new_organization {
            Some(name) => Some(self.organizations.create(name, None).await?.id),
            None => existing_organization,
        };
        if let Some(organization_id) = organization_id {
            self.organizations
                .add_member(organization_id, contact.id, payload.share_tickets_by_default)
                .await?;
        }

        self.organization_service
            .sync_domain_memberships(contact.id, &email)
            .await;

        tracing::info!(contact_id = contact.id, ?organization_id, "Contato criado");
        Ok(contact)
    }

    pub async fn get(&self, id: DbId) -> Result<Contact, AppError> {
        self.users
            .get_contact(id)
            .await?
            .ok_or(AppError::NotFound("contact"))
    }

    pub async fn update(&self, id: DbId, payload: &UpdateContactPayload) -> Result<Contact, AppError> {
        payload.validate()?;
        let current = self.get(id).await?;
        let email = payload.email.trim().to_lowercase();

        let email_changed = current.email.as_deref() != Some(email.as_str());
        if email_changed {
            if let Some(other) = self.users.find_contact_by_email(&email).await? {
                if other.id != id {
                    return Err(AppError::input("contact.alreadyExistsWithEmail"));
                }
            }
        }

        let updated = self
            .users
            .update_contact(
                id,
                &ContactChanges {
                    first_name: payload.first_name.trim().to_string(),
                    last_name: payload.last_name.trim().to_string(),
                    email: email.clone(),
                    phone_number: payload.phone_number.clone(),
                },
            )
            .await?
            .ok_or(AppError::NotFound("contact"))?;

        if let Some(password) = payload.new_password.as_deref() {
            let hashed = hash_password(password).await?;
            self.users.set_password(id, &hashed).await?;
            tracing::info!(contact_id = id, "Senha do contato redefinida pelo agente");
        }

        if email_changed {
            self.organization_service
                .sync_domain_memberships(id, &email)
                .await;
        }
        Ok(updated)
    }

    /// Bloqueia ou desbloqueia o acesso do contato ao portal.
    pub async fn set_enabled(&self, id: DbId, enabled: bool) -> Result<(), AppError> {
        if !self.users.set_enabled(id, enabled).await? {
            return Err(AppError::NotFound("contact"));
        }
        tracing::info!(contact_id = id, enabled, "Acesso do contato alterado");
        Ok(())
    }

    pub async fn send_set_password(&self, id: DbId) -> Result<(), AppError> {
        let contact = self.get(id).await?;
        self.auth.send_reset_link(&contact).await
    }

    pub async fn memberships(&self, id: DbId) -> Result<Vec<ContactOrganizationMembership>, AppError> {
        self.get(id).await?;
        self.organization_service.memberships_for_contact(id).await
    }
}
