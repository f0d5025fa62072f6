//! HTTP client for the Trellis cloud record API, implementing the remote
//! store contract consumed by the reconciliation engine.

mod client;
mod error;

pub use client::RemoteSyncClient;
pub use error::{RemoteSyncError, Result};
