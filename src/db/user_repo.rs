// src/db/user_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::{
        actor::{Agent, UserType},
        auth::Credentials,
        contact::{Contact, ContactChanges, NewContact},
        DbId,
    },
};

/// Agentes e contatos vivem na mesma tabela `users`, separados por `type`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_agent(&self, id: DbId) -> Result<Option<Agent>, AppError>;
    async fn get_contact(&self, id: DbId) -> Result<Option<Contact>, AppError>;
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError>;
    async fn credentials_by_email(&self, email: &str, user_type: UserType) -> Result<Option<Credentials>, AppError>;

    async fn create_contact(&self, new: &NewContact) -> Result<Contact, AppError>;
    async fn update_contact(&self, id: DbId, changes: &ContactChanges) -> Result<Option<Contact>, AppError>;
    async fn set_enabled(&self, id: DbId, enabled: bool) -> Result<bool, AppError>;
    async fn set_password(&self, id: DbId, password_hash: &str) -> Result<(), AppError>;

    async fn save_reset_token(&self, user_id: DbId, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;
    /// Consome o token (uso único). Devolve o dono se o token existia, não foi usado e não expirou.
    async fn consume_reset_token(&self, token: &str) -> Result<Option<DbId>, AppError>;
}

const CONTACT_COLUMNS: &str =
    "id, created_at, updated_at, first_name, last_name, email, phone_number, inbox_id, enabled";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_contact_email_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e, None) {
        return AppError::input("contact.alreadyExistsWithEmail");
    }
    e.into()
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_agent(&self, id: DbId) -> Result<Option<Agent>, AppError> {
        // Permissões e times chegam já resolvidos (cargo -> permissões é feito aqui, no SQL)
        let agent = sqlx::query_as::<_, Agent>(
            r#"
            SELECT
                u.id, u.first_name, u.last_name, COALESCE(u.email, '') AS email, u.enabled,
                COALESCE((
                    SELECT array_agg(DISTINCT p)
                    FROM user_roles ur
                    JOIN roles r ON r.id = ur.role_id
                    CROSS JOIN LATERAL unnest(r.permissions) AS p
                    WHERE ur.user_id = u.id
                ), '{}') AS permissions,
                COALESCE((
                    SELECT array_agg(tm.team_id ORDER BY tm.team_id)
                    FROM team_members tm
                    WHERE tm.user_id = u.id
                ), '{}') AS team_ids
            FROM users u
            WHERE u.id = $1 AND u.type = 'agent'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agent)
    }

    async fn get_contact(&self, id: DbId) -> Result<Option<Contact>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1 AND type = 'contact'", CONTACT_COLUMNS);
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1) AND type = 'contact'",
            CONTACT_COLUMNS
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn credentials_by_email(&self, email: &str, user_type: UserType) -> Result<Option<Credentials>, AppError> {
        let credentials = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT id, type AS user_type, enabled, password_hash
            FROM users
            WHERE LOWER(email) = LOWER($1) AND type = $2
            "#,
        )
        .bind(email)
        .bind(user_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn create_contact(&self, new: &NewContact) -> Result<Contact, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (type, first_name, last_name, email, phone_number, inbox_id)
            VALUES ('contact', $1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(new.phone_number.as_deref())
            .bind(new.inbox_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_contact_email_conflict)?;
        Ok(contact)
    }

    async fn update_contact(&self, id: DbId, changes: &ContactChanges) -> Result<Option<Contact>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, phone_number = $5, updated_at = NOW()
            WHERE id = $1 AND type = 'contact'
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.email)
            .bind(changes.phone_number.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_contact_email_conflict)?;
        Ok(contact)
    }

    async fn set_enabled(&self, id: DbId, enabled: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET enabled = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(enabled)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password(&self, id: DbId, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_reset_token(&self, user_id: DbId, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<DbId>, AppError> {
        // UPDATE ... RETURNING garante o uso único mesmo com requisições concorrentes
        let user_id = sqlx::query_scalar::<_, DbId>(
            r#"
            UPDATE password_reset_tokens
            SET used_at = NOW()
            WHERE token = $1 AND used_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }
}
