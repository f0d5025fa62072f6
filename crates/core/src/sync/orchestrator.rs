//! Full-pass orchestration across all configured collections.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use super::activity_log::{SyncActivityLog, SyncLogEntry, SyncLogLevel};
use super::collection::CollectionSynchronizer;
use super::stores::{LocalRecordStore, RemoteRecordStore};

/// Mutable orchestration state. Only the orchestrator writes to it, so
/// concurrent readers always observe a consistent snapshot.
#[derive(Debug, Default)]
struct SyncActivityState {
    log: SyncActivityLog,
    last_sync_time: Option<DateTime<Utc>>,
}

/// Drives full reconciliation passes over a static set of collections.
///
/// At most one run is active at a time: a `start_sync` while another run is
/// in progress is rejected with a warning, never queued. Failures are
/// reported through the activity log; nothing is thrown to the caller and
/// nothing is retried automatically. Re-running after a partial failure is
/// the retry mechanism, safe because a pass is idempotent by construction.
pub struct SyncOrchestrator {
    collections: Vec<String>,
    synchronizer: CollectionSynchronizer,
    state: Mutex<SyncActivityState>,
    syncing: AtomicBool,
}

/// Clears the in-progress flag when a run exits, on every path.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncOrchestrator {
    /// Create an orchestrator over a fixed set of collection names.
    pub fn new(
        collections: Vec<String>,
        local: Arc<dyn LocalRecordStore>,
        remote: Arc<dyn RemoteRecordStore>,
    ) -> Self {
        Self {
            collections,
            synchronizer: CollectionSynchronizer::new(local, remote),
            state: Mutex::new(SyncActivityState::default()),
            syncing: AtomicBool::new(false),
        }
    }

    /// Run one full reconciliation pass for the authenticated owner.
    ///
    /// Fire-and-forget: errors surface only in the activity log. Collections
    /// are processed sequentially in configured order; a failure in one is
    /// logged and the pass continues with the next.
    pub async fn start_sync(&self, owner_id: Option<&str>) {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("[Sync] Sync already in progress; ignoring start request");
            self.push_log(SyncLogEntry::new(
                SyncLogLevel::Warning,
                "Sync already in progress",
            ));
            return;
        }
        let _guard = SyncingGuard(&self.syncing);

        let owner_id = match owner_id {
            Some(value) => value.to_string(),
            None => {
                error!("[Sync] No authenticated owner; aborting run");
                self.push_log(SyncLogEntry::new(
                    SyncLogLevel::Error,
                    "Cannot sync without an authenticated owner",
                ));
                return;
            }
        };

        self.push_log(SyncLogEntry::new(SyncLogLevel::Info, "Sync started"));

        let mut total_pulled = 0usize;
        let mut total_pushed = 0usize;
        let mut all_clean = true;

        for collection in &self.collections {
            match self
                .synchronizer
                .sync_collection(collection, &owner_id)
                .await
            {
                Ok(outcome) => {
                    total_pulled += outcome.pulled;
                    total_pushed += outcome.pushed;
                    if outcome.is_clean() {
                        self.push_log(
                            SyncLogEntry::new(
                                SyncLogLevel::Success,
                                format!("Synced '{}'", collection),
                            )
                            .with_detail(format!(
                                "pulled={} pushed={}",
                                outcome.pulled, outcome.pushed
                            )),
                        );
                    } else {
                        all_clean = false;
                        let mut detail = format!(
                            "pulled={} pushed={}",
                            outcome.pulled, outcome.pushed
                        );
                        if let Some(pull_error) = &outcome.pull_error {
                            detail.push_str(&format!(" pull_error={}", pull_error));
                        }
                        if !outcome.failed_push_ids.is_empty() {
                            detail.push_str(&format!(
                                " failed_push_ids={}",
                                outcome.failed_push_ids.join(",")
                            ));
                        }
                        self.push_log(
                            SyncLogEntry::new(
                                SyncLogLevel::Warning,
                                format!("Synced '{}' with failures", collection),
                            )
                            .with_detail(detail),
                        );
                    }
                }
                Err(err) => {
                    all_clean = false;
                    warn!("[Sync] Collection '{}' failed: {}", collection, err);
                    self.push_log(
                        SyncLogEntry::new(
                            SyncLogLevel::Warning,
                            format!("Failed to sync '{}'", collection),
                        )
                        .with_detail(err.to_string()),
                    );
                }
            }
        }

        let completed_at = Utc::now();
        {
            let mut state = self.lock_state();
            // Only a fully clean pass advances the completion instant; a
            // partial failure leaves it where it was.
            if all_clean {
                state.last_sync_time = Some(completed_at);
            }
            let level = if all_clean {
                SyncLogLevel::Success
            } else {
                SyncLogLevel::Warning
            };
            state.log.push(SyncLogEntry::new(
                level,
                format!(
                    "Sync finished: pulled={} pushed={}",
                    total_pulled, total_pushed
                ),
            ));
        }
        info!(
            "[Sync] Run complete: pulled={} pushed={} clean={}",
            total_pulled, total_pushed, all_clean
        );
    }

    /// Whether a run is currently active.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Instant of the last fully successful pass, if any.
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_sync_time
    }

    /// Newest-first snapshot of recent activity, capped at 100 entries.
    pub fn recent_logs(&self) -> Vec<SyncLogEntry> {
        self.lock_state().log.snapshot()
    }

    pub fn clear_logs(&self) {
        self.lock_state().log.clear();
    }

    fn push_log(&self, entry: SyncLogEntry) {
        self.lock_state().log.push(entry);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SyncActivityState> {
        // State writes never panic while holding the lock; recover anyway.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
