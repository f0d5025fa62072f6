//! SQLite-backed local record store.
//!
//! Records are stored as opaque JSON payloads keyed by (collection, id).
//! All writes funnel through a single writer actor so concurrent sync
//! passes never contend on the SQLite write lock.

pub mod db;
pub mod errors;
pub mod records;
pub mod schema;

pub use db::{create_pool, get_connection, init, run_migrations, DbPool, WriteHandle};
pub use errors::StorageError;
pub use records::RecordRepository;
