//! Store contracts driven by the reconciliation engine.

use async_trait::async_trait;

use crate::errors::Result;

use super::record::SyncRecord;

/// Local embedded store: full per-owner scans and batched upserts.
#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    /// Fetch every record the store holds for this owner in this collection.
    async fn fetch_by_owner(&self, collection: &str, owner_id: &str) -> Result<Vec<SyncRecord>>;

    /// Upsert the whole batch in one call. Implementations must apply it as
    /// a single transaction, not record-by-record.
    async fn bulk_upsert(&self, collection: &str, records: Vec<SyncRecord>) -> Result<()>;
}

/// Remote authoritative store: full per-owner scans and point writes.
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    /// Fetch every record the store holds for this owner in this collection.
    async fn fetch_by_owner(&self, collection: &str, owner_id: &str) -> Result<Vec<SyncRecord>>;

    /// Write one record keyed by its id within the collection.
    async fn write_one(&self, collection: &str, record_id: &str, record: &SyncRecord)
        -> Result<()>;
}
