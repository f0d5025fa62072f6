//! Repository implementing the local record store contract.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use trellis_core::errors::{DatabaseError, Error, Result};
use trellis_core::sync::{LocalRecordStore, SyncRecord};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::records::model::RecordRowDB;
use crate::schema::records;

pub struct RecordRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RecordRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_by_owner(
    conn: &mut SqliteConnection,
    collection: &str,
    owner_id: &str,
) -> Result<Vec<SyncRecord>> {
    let rows = records::table
        .filter(records::collection.eq(collection))
        .filter(records::owner_id.eq(owner_id))
        .order(records::id.asc())
        .load::<RecordRowDB>(conn)
        .map_err(StorageError::from)?;

    rows.into_iter().map(RecordRowDB::into_record).collect()
}

#[async_trait]
impl LocalRecordStore for RecordRepository {
    async fn fetch_by_owner(&self, collection: &str, owner_id: &str) -> Result<Vec<SyncRecord>> {
        let pool = Arc::clone(&self.pool);
        let collection = collection.to_string();
        let owner_id = owner_id.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection(&pool)?;
            load_by_owner(&mut conn, &collection, &owner_id)
        })
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::Internal(format!("Read worker failed: {}", e)))
        })?
    }

    async fn bulk_upsert(&self, collection: &str, batch: Vec<SyncRecord>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let collection = collection.to_string();

        // The writer actor wraps the job in one transaction, so the
        // whole batch lands atomically.
        self.writer
            .exec(move |conn| {
                let rows = batch
                    .iter()
                    .map(|record| RecordRowDB::from_record(&collection, record))
                    .collect::<Result<Vec<_>>>()?;

                diesel::replace_into(records::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }
}
