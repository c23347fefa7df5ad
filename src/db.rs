// src/db.rs

use std::sync::Arc;

use sqlx::PgPool;

pub mod conversation_repo;
pub use conversation_repo::{ConversationRepository, ConversationStore};
pub mod organization_repo;
pub use organization_repo::{OrganizationRepository, OrganizationStore};
pub mod user_repo;
pub use user_repo::{UserRepository, UserStore};
pub mod team_repo;
pub use team_repo::{TeamRepository, TeamStore};
pub mod status_repo;
pub use status_repo::{StatusRepository, StatusStore};
pub mod view_repo;
pub use view_repo::{ViewRepository, ViewStore};
pub mod inbox_repo;
pub use inbox_repo::{InboxRepository, InboxStore};
pub mod settings_repo;
pub use settings_repo::{SettingsRepository, SettingsStore};

#[cfg(test)]
pub mod memory;

/// Todos os colaboradores de persistência, atrás de traits.
#[derive(Clone)]
pub struct Stores {
    pub conversations: Arc<dyn ConversationStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub statuses: Arc<dyn StatusStore>,
    pub views: Arc<dyn ViewStore>,
    pub inboxes: Arc<dyn InboxStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            conversations: Arc::new(ConversationRepository::new(pool.clone())),
            organizations: Arc::new(OrganizationRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            teams: Arc::new(TeamRepository::new(pool.clone())),
            statuses: Arc::new(StatusRepository::new(pool.clone())),
            views: Arc::new(ViewRepository::new(pool.clone())),
            inboxes: Arc::new(InboxRepository::new(pool.clone())),
            settings: Arc::new(SettingsRepository::new(pool)),
        }
    }
}
