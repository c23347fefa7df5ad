// src/models/view.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{conversation::Conversation, DbId};

// Mapeia o CREATE TYPE view_visibility do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "view_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ViewVisibility {
    User,
    Team,
    All,
}

/// Filtro salvo sobre as conversas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: DbId,
    #[schema(example = "Urgentes do financeiro")]
    pub name: String,
    pub user_id: Option<DbId>,
    pub team_id: Option<DbId>,
    pub visibility: ViewVisibility,
    #[schema(value_type = Object)]
    pub filters: Value,
    pub created_at: DateTime<Utc>,
}

// --- FILTROS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    StatusId,
    InboxId,
    AssignedUserId,
    AssignedTeamId,
    ContactId,
    Tags,
}

impl FilterField {
    pub fn column(&self) -> &'static str {
        match self {
            FilterField::StatusId => "status_id",
            FilterField::InboxId => "inbox_id",
            FilterField::AssignedUserId => "assigned_user_id",
            FilterField::AssignedTeamId => "assigned_team_id",
            FilterField::ContactId => "contact_id",
            FilterField::Tags => "tags",
        }
    }

    fn id_value(&self, conversation: &Conversation) -> Option<DbId> {
        match self {
            FilterField::StatusId => Some(conversation.status_id),
            FilterField::InboxId => Some(conversation.inbox_id),
            FilterField::AssignedUserId => conversation.assigned_user_id,
            FilterField::AssignedTeamId => conversation.assigned_team_id,
            FilterField::ContactId => Some(conversation.contact_id),
            FilterField::Tags => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Set,
    NotSet,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub field: FilterField,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl ViewFilter {
    /// Converte o JSON salvo na view. Retorna `None` se algum filtro for inválido.
    pub fn parse_list(raw: &Value) -> Option<Vec<ViewFilter>> {
        if raw.is_null() {
            return Some(Vec::new());
        }
        let filters: Vec<ViewFilter> = serde_json::from_value(raw.clone()).ok()?;
        filters.iter().all(ViewFilter::is_valid).then_some(filters)
    }

    pub fn is_valid(&self) -> bool {
        match (self.field, self.operator) {
            (FilterField::Tags, FilterOperator::Contains) => self.value.is_string(),
            (FilterField::Tags, FilterOperator::Set | FilterOperator::NotSet) => true,
            (FilterField::Tags, _) => false,
            (_, FilterOperator::Contains) => false,
            (_, FilterOperator::Equals | FilterOperator::NotEquals) => self.value.is_i64(),
            (_, FilterOperator::Set | FilterOperator::NotSet) => true,
        }
    }

    pub fn id_operand(&self) -> Option<DbId> {
        self.value.as_i64()
    }

    pub fn matches(&self, conversation: &Conversation) -> bool {
        if self.field == FilterField::Tags {
            return match self.operator {
                FilterOperator::Contains => self
                    .value
                    .as_str()
                    .is_some_and(|tag| conversation.tags.iter().any(|t| t == tag)),
                FilterOperator::Set => !conversation.tags.is_empty(),
                FilterOperator::NotSet => conversation.tags.is_empty(),
                _ => false,
            };
        }

        let actual = self.field.id_value(conversation);
        match self.operator {
            FilterOperator::Equals => actual.is_some() && actual == self.id_operand(),
            FilterOperator::NotEquals => actual != self.id_operand(),
            FilterOperator::Set => actual.is_some(),
            FilterOperator::NotSet => actual.is_none(),
            FilterOperator::Contains => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_rejects_contains_on_id_fields() {
        let raw = json!([{ "field": "status_id", "operator": "contains", "value": 1 }]);
        assert!(ViewFilter::parse_list(&raw).is_none());
    }

    #[test]
    fn parse_accepts_null_as_no_filters() {
        assert_eq!(ViewFilter::parse_list(&Value::Null), Some(vec![]));
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let raw = json!([{ "field": "priority", "operator": "equals", "value": 1 }]);
        assert!(ViewFilter::parse_list(&raw).is_none());
    }

    #[test]
    fn parse_accepts_tag_contains() {
        let raw = json!([
            { "field": "tags", "operator": "contains", "value": "vip" },
            { "field": "assigned_user_id", "operator": "not_set" }
        ]);
        let filters = ViewFilter::parse_list(&raw).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].operator, FilterOperator::NotSet);
    }
}
