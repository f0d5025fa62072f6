//! Connection pool, migrations, and write serialization for the SQLite store.

pub mod write_actor;

use std::path::Path;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use trellis_core::errors::{DatabaseError, Error, Result};

pub use write_actor::{spawn_writer, WriteHandle};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const DB_FILE_NAME: &str = "trellis.db";
const POOL_SIZE: u32 = 5;
const BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Debug)]
struct ConnectionOptions;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Resolve the database file path inside the app data directory,
/// creating the directory if needed.
pub fn init(app_data_dir: &str) -> Result<String> {
    let dir = Path::new(app_data_dir);
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "Failed to create app data directory: {}",
                e
            )))
        })?;
    }
    Ok(dir.join(DB_FILE_NAME).to_string_lossy().to_string())
}

/// Apply pending migrations on a dedicated connection.
pub fn run_migrations(db_path: &str) -> Result<()> {
    let mut conn = SqliteConnection::establish(db_path)
        .map_err(|e| Error::Database(DatabaseError::Connection(e.to_string())))?;

    conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
        Error::Database(DatabaseError::Internal(format!("Migration failed: {}", e)))
    })?;

    Ok(())
}

/// Build the shared read pool.
pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|e| Error::Database(DatabaseError::Connection(e.to_string())))?;

    Ok(Arc::new(pool))
}

/// Check out a pooled connection.
pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get()
        .map_err(|e| Error::Database(DatabaseError::Connection(e.to_string())))
}
