//! Storage-level error type and its mapping into the shared error enum.

use thiserror::Error;

use trellis_core::errors::DatabaseError;

/// Errors raised by the SQLite storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Query execution error
    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// Migration error
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Payload serialization error
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for trellis_core::Error {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Query(e) => Self::Database(DatabaseError::Query(e.to_string())),
            StorageError::Pool(e) => Self::Database(DatabaseError::Connection(e.to_string())),
            StorageError::Migration(e) => Self::Database(DatabaseError::Internal(e)),
            StorageError::Serialization(e) => Self::Serialization(e),
        }
    }
}
