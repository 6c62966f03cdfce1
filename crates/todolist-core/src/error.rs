//! Domain-level error types.

use thiserror::Error;

/// Repository-level errors.
///
/// A missing row is not an error: lookups return `Option` and writes return
/// the number of affected rows.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Query(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}
