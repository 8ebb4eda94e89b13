use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DbError> for sumii_core::SumiiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(m) => sumii_core::SumiiError::NotFound(m),
            DbError::Forbidden(m) => sumii_core::SumiiError::Forbidden(m),
            DbError::Conflict(m) => sumii_core::SumiiError::Conflict(m),
            DbError::Sqlite(e) => sumii_core::SumiiError::Database(e.to_string()),
            DbError::Serialization(e) => sumii_core::SumiiError::Database(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Distinguish "row doesn't exist" from "row exists but belongs to someone
/// else" — the former is `NotFound`, the latter is
/// `Forbidden`.
pub fn owned_or_forbidden<T>(
    row: Option<T>,
    owner_of: impl Fn(&T) -> &str,
    requester_id: &str,
    what: &str,
) -> Result<T> {
    match row {
        None => Err(DbError::NotFound(what.to_string())),
        Some(row) if owner_of(&row) == requester_id => Ok(row),
        Some(_) => Err(DbError::Forbidden(what.to_string())),
    }
}
