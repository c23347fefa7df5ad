// src/db/conversation_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        conversation::{Conversation, Message, NewConversation, NewMessage},
        pagination::Pagination,
        scope::{ConversationQuery, ScopeClause},
        view::{FilterField, FilterOperator, ViewFilter},
        DbId,
    },
};

/// Persistência das conversas e mensagens.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Conversation>, AppError>;
    async fn create(&self, new: &NewConversation) -> Result<Conversation, AppError>;
    // Só usado como compensação quando a primeira mensagem falha
    async fn delete(&self, uuid: Uuid) -> Result<(), AppError>;

    async fn save_assignment(
        &self,
        uuid: Uuid,
        user_id: Option<DbId>,
        team_id: Option<DbId>,
    ) -> Result<(), AppError>;
    async fn save_status(
        &self,
        uuid: Uuid,
        status_id: DbId,
        snoozed_until: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;
    async fn update_organization_id(&self, uuid: Uuid, organization_id: Option<DbId>) -> Result<(), AppError>;
    async fn set_tags(&self, uuid: Uuid, tags: &[String]) -> Result<(), AppError>;
    async fn update_custom_attributes(&self, uuid: Uuid, attributes: &Value) -> Result<(), AppError>;

    async fn list(&self, query: &ConversationQuery) -> Result<(Vec<Conversation>, i64), AppError>;
    async fn list_for_contact(
        &self,
        contact_id: DbId,
        organization_id: Option<DbId>,
        pagination: Pagination,
    ) -> Result<(Vec<Conversation>, i64), AppError>;
    async fn mentioned_user_ids(&self, conversation_id: DbId) -> Result<Vec<DbId>, AppError>;

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, AppError>;
    async fn list_messages(&self, conversation_id: DbId, include_private: bool) -> Result<Vec<Message>, AppError>;
}

const CONVERSATION_COLUMNS: &str = r#"
    c.id, c.uuid, c.created_at, c.updated_at, c.contact_id, c.inbox_id,
    c.assigned_user_id, c.assigned_team_id, c.status_id, c.snoozed_until,
    c.organization_id, c.subject, c.tags, c.custom_attributes
"#;

// Linha da listagem com o total calculado por window function
#[derive(FromRow)]
struct ConversationPageRow {
    #[sqlx(flatten)]
    conversation: Conversation,
    total: i64,
}

fn into_page(rows: Vec<ConversationPageRow>) -> (Vec<Conversation>, i64) {
    let total = rows.first().map(|r| r.total).unwrap_or(0);
    (rows.into_iter().map(|r| r.conversation).collect(), total)
}

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &ScopeClause) {
        match clause {
            ScopeClause::All => {
                builder.push("TRUE");
            }
            ScopeClause::Unassigned => {
                builder.push("(c.assigned_user_id IS NULL AND c.assigned_team_id IS NULL)");
            }
            ScopeClause::AssignedTo(user_id) => {
                builder.push("c.assigned_user_id = ").push_bind(*user_id);
            }
            ScopeClause::MentionedUser(user_id) => {
                builder
                    .push("EXISTS (SELECT 1 FROM conversation_mentions m WHERE m.conversation_id = c.id AND m.user_id = ")
                    .push_bind(*user_id)
                    .push(")");
            }
            ScopeClause::TeamUnassigned(teams) => {
                builder
                    .push("(c.assigned_user_id IS NULL AND c.assigned_team_id = ANY(")
                    .push_bind(teams.clone())
                    .push("))");
            }
            ScopeClause::TeamAll(teams) => {
                builder
                    .push("c.assigned_team_id = ANY(")
                    .push_bind(teams.clone())
                    .push(")");
            }
        }
    }

    // Os nomes de coluna vêm do enum FilterField, nunca do cliente
    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ViewFilter) {
        let column = format!("c.{}", filter.field.column());
        if filter.field == FilterField::Tags {
            match filter.operator {
                FilterOperator::Contains => {
                    let tag = filter.value.as_str().unwrap_or_default().to_string();
                    builder.push_bind(tag).push(format!(" = ANY({})", column));
                }
                FilterOperator::Set => {
                    builder.push(format!("cardinality({}) > 0", column));
                }
                FilterOperator::NotSet => {
                    builder.push(format!("cardinality({}) = 0", column));
                }
                _ => {
                    builder.push("FALSE");
                }
            }
            return;
        }

        match filter.operator {
            FilterOperator::Equals => {
                builder.push(format!("{} = ", column)).push_bind(filter.id_operand());
            }
            FilterOperator::NotEquals => {
                builder
                    .push(format!("{} IS DISTINCT FROM ", column))
                    .push_bind(filter.id_operand());
            }
            FilterOperator::Set => {
                builder.push(format!("{} IS NOT NULL", column));
            }
            FilterOperator::NotSet => {
                builder.push(format!("{} IS NULL", column));
            }
            FilterOperator::Contains => {
                builder.push("FALSE");
            }
        }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Conversation>, AppError> {
        let sql = format!("SELECT {} FROM conversations c WHERE c.uuid = $1", CONVERSATION_COLUMNS);
        let conversation = sqlx::query_as::<_, Conversation>(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(conversation)
    }

    async fn create(&self, new: &NewConversation) -> Result<Conversation, AppError> {
        let sql = format!(
            r#"
            INSERT INTO conversations AS c (contact_id, inbox_id, subject, organization_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CONVERSATION_COLUMNS
        );
        let conversation = sqlx::query_as::<_, Conversation>(&sql)
            .bind(new.contact_id)
            .bind(new.inbox_id)
            .bind(new.subject.as_deref())
            .bind(new.organization_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(conversation)
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM conversations WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_assignment(
        &self,
        uuid: Uuid,
        user_id: Option<DbId>,
        team_id: Option<DbId>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET assigned_user_id = $2, assigned_team_id = $3, updated_at = NOW()
            WHERE uuid = $1
            "#,
        )
        .bind(uuid)
        .bind(user_id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_status(
        &self,
        uuid: Uuid,
        status_id: DbId,
        snoozed_until: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET status_id = $2, snoozed_until = $3, updated_at = NOW()
            WHERE uuid = $1
            "#,
        )
        .bind(uuid)
        .bind(status_id)
        .bind(snoozed_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_organization_id(&self, uuid: Uuid, organization_id: Option<DbId>) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET organization_id = $2, updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_tags(&self, uuid: Uuid, tags: &[String]) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET tags = $2, updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .bind(tags)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_custom_attributes(&self, uuid: Uuid, attributes: &Value) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET custom_attributes = $2, updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .bind(attributes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ConversationQuery) -> Result<(Vec<Conversation>, i64), AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM conversations c WHERE (",
            CONVERSATION_COLUMNS
        ));

        // Escopos: OR entre si
        if query.clauses.is_empty() {
            builder.push("FALSE");
        }
        for (i, clause) in query.clauses.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            Self::push_clause(&mut builder, clause);
        }
        builder.push(")");

        // Filtros da view: AND por cima dos escopos
        for filter in &query.filters {
            builder.push(" AND ");
            Self::push_filter(&mut builder, filter);
        }

        builder.push(format!(
            " ORDER BY c.{} {}, c.id {}",
            query.order_by.column(),
            query.order.keyword(),
            query.order.keyword()
        ));
        builder
            .push(" LIMIT ")
            .push_bind(query.pagination.page_size)
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());

        let rows = builder
            .build_query_as::<ConversationPageRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(into_page(rows))
    }

    async fn list_for_contact(
        &self,
        contact_id: DbId,
        organization_id: Option<DbId>,
        pagination: Pagination,
    ) -> Result<(Vec<Conversation>, i64), AppError> {
        let sql = format!(
            r#"
            SELECT {}, COUNT(*) OVER() AS total
            FROM conversations c
            WHERE c.contact_id = $1
               OR ($2::BIGINT IS NOT NULL AND c.organization_id = $2)
            ORDER BY c.updated_at DESC, c.id DESC
            LIMIT $3 OFFSET $4
            "#,
            CONVERSATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ConversationPageRow>(&sql)
            .bind(contact_id)
            .bind(organization_id)
            .bind(pagination.page_size)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(into_page(rows))
    }

    async fn mentioned_user_ids(&self, conversation_id: DbId) -> Result<Vec<DbId>, AppError> {
        let ids = sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT user_id FROM conversation_mentions WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, sender_type, direction, content, private)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, uuid, conversation_id, sender_id, sender_type, direction, content, private, created_at
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(message.sender_type)
        .bind(message.direction)
        .bind(&message.content)
        .bind(message.private)
        .fetch_one(&mut *tx)
        .await?;

        // Mensagem nova "toca" a conversa para a ordenação por updated_at
        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(message.conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_messages(&self, conversation_id: DbId, include_private: bool) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, uuid, conversation_id, sender_id, sender_type, direction, content, private, created_at
            FROM messages
            WHERE conversation_id = $1 AND ($2 OR private = FALSE)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(conversation_id)
        .bind(include_private)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}
