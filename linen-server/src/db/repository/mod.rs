//! Repository Module
//!
//! CRUD operations over the SQLite ledger tables. Repositories are free
//! async functions taking `&SqlitePool` (or a transaction for the composite
//! atomic operations); they receive and return `shared::models` row types.

pub mod booking;
pub mod item;
pub mod planned_event;
pub mod setting;
pub mod stock;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
