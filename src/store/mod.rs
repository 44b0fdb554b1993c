// Data-access layer - one module per entity family, all side effects on the pool
pub mod comments;
pub mod custom_lists;
pub mod follows;
pub mod movies;
pub mod profiles;
pub mod reviews;
pub mod saved_movies;
pub mod votes;

#[cfg(test)]
pub(crate) mod testutil;

use rusqlite::ffi;
use thiserror::Error;

/// Failure taxonomy for every store operation. Constraint failures are
/// classified from SQLite extended result codes so callers can branch on
/// "already exists" / "missing row" without touching driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
            return StoreError::NotFound;
        }
        if let rusqlite::Error::SqliteFailure(code, ref message) = err {
            let text = message.clone().unwrap_or_else(|| code.to_string());
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::UniqueViolation(text);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::ForeignKeyViolation(text);
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, StoreError::ForeignKeyViolation(_))
    }
}
