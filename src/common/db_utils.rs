// src/common/db_utils.rs

/// `true` quando o erro do Postgres é uma violação de UNIQUE (opcionalmente numa constraint específica).
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return match constraint {
                Some(name) => db_err.constraint() == Some(name),
                None => true,
            };
        }
    }
    false
}
