// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::{actor::Actor, permission},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião). Exige um agente com o slug `T::slug()`.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agent = match parts.extensions.get::<Actor>() {
            Some(Actor::Agent(agent)) => agent,
            Some(Actor::Contact(_)) => return Err(AppError::PermissionDenied("globals.permissionDenied")),
            None => return Err(AppError::InvalidToken),
        };

        let required_perm = T::slug();
        if !agent.has_permission(required_perm) {
            tracing::debug!(user_id = agent.id, permission = required_perm, "Permissão ausente");
            return Err(AppError::PermissionDenied("globals.permissionDenied"));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermConversationsWrite;
impl PermissionDef for PermConversationsWrite {
    fn slug() -> &'static str { permission::CONVERSATIONS_WRITE }
}

pub struct PermUpdateUserAssignee;
impl PermissionDef for PermUpdateUserAssignee {
    fn slug() -> &'static str { permission::CONVERSATIONS_UPDATE_USER_ASSIGNEE }
}

pub struct PermUpdateTeamAssignee;
impl PermissionDef for PermUpdateTeamAssignee {
    fn slug() -> &'static str { permission::CONVERSATIONS_UPDATE_TEAM_ASSIGNEE }
}

pub struct PermUpdateStatus;
impl PermissionDef for PermUpdateStatus {
    fn slug() -> &'static str { permission::CONVERSATIONS_UPDATE_STATUS }
}

pub struct PermUpdateTags;
impl PermissionDef for PermUpdateTags {
    fn slug() -> &'static str { permission::CONVERSATIONS_UPDATE_TAGS }
}

pub struct PermContactsRead;
impl PermissionDef for PermContactsRead {
    fn slug() -> &'static str { permission::CONTACTS_READ }
}

pub struct PermContactsWrite;
impl PermissionDef for PermContactsWrite {
    fn slug() -> &'static str { permission::CONTACTS_WRITE }
}

pub struct PermOrganizationsManage;
impl PermissionDef for PermOrganizationsManage {
    fn slug() -> &'static str { permission::ORGANIZATIONS_MANAGE }
}

pub struct PermStatusManage;
impl PermissionDef for PermStatusManage {
    fn slug() -> &'static str { permission::STATUS_MANAGE }
}

pub struct PermSettingsManage;
impl PermissionDef for PermSettingsManage {
    fn slug() -> &'static str { permission::SETTINGS_MANAGE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actor::Agent;
    use axum::http::Request;

    fn parts_with(actor: Option<Actor>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(actor) = actor {
            parts.extensions.insert(actor);
        }
        parts
    }

    fn agent(permissions: &[&str]) -> Actor {
        Actor::Agent(Agent {
            id: 1,
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: "ana@helpdesk.test".into(),
            enabled: true,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            team_ids: vec![],
        })
    }

    #[tokio::test]
    async fn agent_with_slug_passes() {
        let mut parts = parts_with(Some(agent(&[permission::STATUS_MANAGE])));
        assert!(RequirePermission::<PermStatusManage>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_slug_or_actor_is_rejected() {
        let mut parts = parts_with(Some(agent(&[permission::CONTACTS_READ])));
        let err = RequirePermission::<PermContactsWrite>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let mut parts = parts_with(None);
        let err = RequirePermission::<PermContactsWrite>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
