//! Trellis core domain: the reconciliation engine that keeps the local
//! embedded store and the remote authoritative store converged.

pub mod errors;
pub mod sync;

pub use errors::{Error, Result};
