// src/models/scope.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    actor::Agent,
    conversation::Conversation,
    pagination::{OrderBy, Pagination, SortOrder},
    view::ViewFilter,
    DbId,
};

/// Categoria nomeada de conversas. Calculada por requisição, nunca persistida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Unassigned,
    AssignedToMe,
    Mentioned,
    TeamUnassigned,
    TeamAll,
}

impl Scope {
    /// `true` se quem possui `self` pode consultar `other`.
    pub fn covers(&self, other: Scope) -> bool {
        match (self, other) {
            (Scope::All, _) => true,
            (Scope::TeamAll, Scope::TeamUnassigned) => true,
            (a, b) => *a == b,
        }
    }

    /// Deriva os parâmetros da consulta a partir da identidade do agente.
    pub fn clause_for(&self, agent: &Agent) -> ScopeClause {
        match self {
            Scope::All => ScopeClause::All,
            Scope::Unassigned => ScopeClause::Unassigned,
            Scope::AssignedToMe => ScopeClause::AssignedTo(agent.id),
            Scope::Mentioned => ScopeClause::MentionedUser(agent.id),
            Scope::TeamUnassigned => ScopeClause::TeamUnassigned(agent.team_ids.clone()),
            Scope::TeamAll => ScopeClause::TeamAll(agent.team_ids.clone()),
        }
    }
}

/// Forma concreta de um escopo, já com os ids do ator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeClause {
    All,
    Unassigned,
    AssignedTo(DbId),
    MentionedUser(DbId),
    TeamUnassigned(Vec<DbId>),
    TeamAll(Vec<DbId>),
}

impl ScopeClause {
    // Avaliado sobre os campos atuais da conversa, nunca sobre cache
    pub fn matches(&self, conversation: &Conversation, mentioned_user_ids: &[DbId]) -> bool {
        match self {
            ScopeClause::All => true,
            ScopeClause::Unassigned => {
                conversation.assigned_user_id.is_none() && conversation.assigned_team_id.is_none()
            }
            ScopeClause::AssignedTo(user_id) => conversation.assigned_user_id == Some(*user_id),
            ScopeClause::MentionedUser(user_id) => mentioned_user_ids.contains(user_id),
            ScopeClause::TeamUnassigned(teams) => {
                conversation.assigned_user_id.is_none()
                    && conversation
                        .assigned_team_id
                        .is_some_and(|team| teams.contains(&team))
            }
            ScopeClause::TeamAll(teams) => conversation
                .assigned_team_id
                .is_some_and(|team| teams.contains(&team)),
        }
    }
}

/// Alvo de uma listagem feita por um agente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    All,
    Unassigned,
    Assigned,
    Mentioned,
    TeamUnassigned(DbId),
    TeamAll(DbId),
    View(DbId),
}

impl ListTarget {
    pub fn scope(&self) -> Option<Scope> {
        match self {
            ListTarget::All => Some(Scope::All),
            ListTarget::Unassigned => Some(Scope::Unassigned),
            ListTarget::Assigned => Some(Scope::AssignedToMe),
            ListTarget::Mentioned => Some(Scope::Mentioned),
            ListTarget::TeamUnassigned(_) => Some(Scope::TeamUnassigned),
            ListTarget::TeamAll(_) => Some(Scope::TeamAll),
            ListTarget::View(_) => None,
        }
    }
}

/// Consulta paginada: cláusulas de escopo combinadas com OR, filtros da view com AND.
#[derive(Debug, Clone)]
pub struct ConversationQuery {
    pub clauses: Vec<ScopeClause>,
    pub filters: Vec<ViewFilter>,
    pub order_by: OrderBy,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl ConversationQuery {
    pub fn matches(&self, conversation: &Conversation, mentioned_user_ids: &[DbId]) -> bool {
        self.clauses
            .iter()
            .any(|c| c.matches(conversation, mentioned_user_ids))
            && self.filters.iter().all(|f| f.matches(conversation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn conversation(user: Option<DbId>, team: Option<DbId>) -> Conversation {
        Conversation {
            id: 1,
            uuid: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            contact_id: 50,
            inbox_id: 1,
            assigned_user_id: user,
            assigned_team_id: team,
            status_id: 1,
            snoozed_until: None,
            organization_id: None,
            subject: None,
            tags: vec![],
            custom_attributes: serde_json::json!({}),
        }
    }

    fn agent(teams: Vec<DbId>) -> Agent {
        Agent {
            id: 7,
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: "ana@helpdesk.test".into(),
            enabled: true,
            permissions: vec![],
            team_ids: teams,
        }
    }

    #[test]
    fn all_covers_everything_and_team_all_covers_team_unassigned() {
        assert!(Scope::All.covers(Scope::Mentioned));
        assert!(Scope::TeamAll.covers(Scope::TeamUnassigned));
        assert!(!Scope::TeamUnassigned.covers(Scope::TeamAll));
        assert!(!Scope::Unassigned.covers(Scope::AssignedToMe));
    }

    #[test]
    fn unassigned_requires_no_user_and_no_team() {
        let clause = ScopeClause::Unassigned;
        assert!(clause.matches(&conversation(None, None), &[]));
        assert!(!clause.matches(&conversation(None, Some(3)), &[]));
        assert!(!clause.matches(&conversation(Some(9), None), &[]));
    }

    #[test]
    fn team_clauses_use_agent_teams() {
        let a = agent(vec![3]);
        let team_unassigned = Scope::TeamUnassigned.clause_for(&a);
        let team_all = Scope::TeamAll.clause_for(&a);

        assert!(team_unassigned.matches(&conversation(None, Some(3)), &[]));
        assert!(!team_unassigned.matches(&conversation(Some(9), Some(3)), &[]));
        assert!(team_all.matches(&conversation(Some(9), Some(3)), &[]));
        assert!(!team_all.matches(&conversation(None, Some(4)), &[]));
    }

    #[test]
    fn assigned_and_mentioned_use_agent_id() {
        let a = agent(vec![]);
        assert!(Scope::AssignedToMe.clause_for(&a).matches(&conversation(Some(7), None), &[]));
        assert!(!Scope::AssignedToMe.clause_for(&a).matches(&conversation(Some(8), None), &[]));
        assert!(Scope::Mentioned.clause_for(&a).matches(&conversation(None, None), &[7]));
    }
}
