//! Error types shared across the Trellis crates.

use thiserror::Error;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors originating in the local database layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Top-level error for sync and storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote store rejected or failed an operation
    #[error("Remote store error: {0}")]
    RemoteStore(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A network-bound call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Engine-level failure that fits no other bucket
    #[error("Sync error: {0}")]
    Sync(String),
}

impl Error {
    /// Create a remote store error
    pub fn remote_store(message: impl Into<String>) -> Self {
        Self::RemoteStore(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a sync error
    pub fn sync(message: impl Into<String>) -> Self {
        Self::Sync(message.into())
    }
}
