//! Record reconciliation between the local embedded store and the remote
//! authoritative store.
//!
//! Both sides are scanned per owner and collection; each record key present
//! on either side gets a last-write-wins decision, ties favoring no action.

mod activity_log;
mod collection;
mod orchestrator;
mod reconcile;
mod record;
mod stores;

pub use activity_log::*;
pub use collection::*;
pub use orchestrator::*;
pub use reconcile::*;
pub use record::*;
pub use stores::*;
