//! One collection's reconciliation pass against both stores.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::errors::{Error, Result};

use super::reconcile::{decide_action, SyncAction, CLOCK_SKEW_TOLERANCE_MS};
use super::record::SyncRecord;
use super::stores::{LocalRecordStore, RemoteRecordStore};

/// Upper bound for one full-collection fetch on either side.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for the local bulk upsert and for each remote point write.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Counts and failures for one collection's pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSyncOutcome {
    pub pulled: usize,
    pub pushed: usize,
    /// Record ids whose remote point write failed; kept for a future
    /// selective-retry pass instead of being silently swallowed.
    pub failed_push_ids: Vec<String>,
    /// Set when the local bulk upsert failed; the push phase still ran.
    pub pull_error: Option<String>,
}

impl CollectionSyncOutcome {
    /// True when the pass completed with no failed writes on either side.
    pub fn is_clean(&self) -> bool {
        self.failed_push_ids.is_empty() && self.pull_error.is_none()
    }
}

/// Drives one named collection end-to-end: fetch both sides for an owner,
/// reconcile every key present on either side, batch the resulting writes.
pub struct CollectionSynchronizer {
    local: Arc<dyn LocalRecordStore>,
    remote: Arc<dyn RemoteRecordStore>,
}

impl CollectionSynchronizer {
    pub fn new(local: Arc<dyn LocalRecordStore>, remote: Arc<dyn RemoteRecordStore>) -> Self {
        Self { local, remote }
    }

    /// Run one reconciliation pass for `(collection, owner_id)`.
    ///
    /// A fetch failure on either side is fatal to this collection's pass.
    /// Write failures are not: the bulk upsert and each point write are
    /// caught independently and surfaced through the outcome.
    pub async fn sync_collection(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> Result<CollectionSyncOutcome> {
        let (remote_records, local_records) = tokio::try_join!(
            self.fetch_side(collection, owner_id, Side::Remote),
            self.fetch_side(collection, owner_id, Side::Local),
        )?;

        let remote_by_id: HashMap<String, SyncRecord> = remote_records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        let local_by_id: HashMap<String, SyncRecord> = local_records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        // BTreeSet union keeps the fold order deterministic for logging.
        let keys: BTreeSet<&String> = remote_by_id.keys().chain(local_by_id.keys()).collect();

        let mut pull_batch: Vec<SyncRecord> = Vec::new();
        let mut push_targets: Vec<&SyncRecord> = Vec::new();
        for key in keys {
            let local = local_by_id.get(key.as_str());
            let remote = remote_by_id.get(key.as_str());
            match decide_action(local, remote, CLOCK_SKEW_TOLERANCE_MS) {
                SyncAction::PullToLocal => {
                    if let Some(record) = remote {
                        pull_batch.push(record.clone());
                    }
                }
                SyncAction::PushToRemote => {
                    if let Some(record) = local {
                        push_targets.push(record);
                    }
                }
                SyncAction::InSync => {}
            }
        }
        debug!(
            "[Sync] '{}' reconciled for owner {}: {} to pull, {} to push",
            collection,
            owner_id,
            pull_batch.len(),
            push_targets.len()
        );

        let mut outcome = CollectionSyncOutcome::default();

        // Pull phase: one batched call so local transaction overhead stays
        // bounded. A failure here fails the pull phase only.
        if !pull_batch.is_empty() {
            let batch_len = pull_batch.len();
            match timeout(
                WRITE_TIMEOUT,
                self.local.bulk_upsert(collection, pull_batch),
            )
            .await
            {
                Ok(Ok(())) => outcome.pulled = batch_len,
                Ok(Err(err)) => {
                    warn!("[Sync] Bulk upsert failed for '{}': {}", collection, err);
                    outcome.pull_error = Some(err.to_string());
                }
                Err(_) => {
                    warn!("[Sync] Bulk upsert timed out for '{}'", collection);
                    outcome.pull_error = Some("local bulk upsert timed out".to_string());
                }
            }
        }

        // Push phase: individual point writes; one record's failure must not
        // kill the loop.
        for record in push_targets {
            match timeout(
                WRITE_TIMEOUT,
                self.remote.write_one(collection, &record.id, record),
            )
            .await
            {
                Ok(Ok(())) => outcome.pushed += 1,
                Ok(Err(err)) => {
                    warn!(
                        "[Sync] Remote write failed for '{}/{}': {}",
                        collection, record.id, err
                    );
                    outcome.failed_push_ids.push(record.id.clone());
                }
                Err(_) => {
                    warn!(
                        "[Sync] Remote write timed out for '{}/{}'",
                        collection, record.id
                    );
                    outcome.failed_push_ids.push(record.id.clone());
                }
            }
        }

        Ok(outcome)
    }

    async fn fetch_side(
        &self,
        collection: &str,
        owner_id: &str,
        side: Side,
    ) -> Result<Vec<SyncRecord>> {
        let fetch = async {
            match side {
                Side::Local => self.local.fetch_by_owner(collection, owner_id).await,
                Side::Remote => self.remote.fetch_by_owner(collection, owner_id).await,
            }
        };
        match timeout(FETCH_TIMEOUT, fetch).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!(
                "{} fetch timed out for '{}'",
                side.label(),
                collection
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Local,
    Remote,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Local => "local",
            Side::Remote => "remote",
        }
    }
}
