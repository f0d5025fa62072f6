//! Last-write-wins decision for a single record's version pair.

use serde::{Deserialize, Serialize};

use super::record::{extract_timestamp, SyncRecord};

/// Clock-skew window within which two timestamps are treated as equal.
pub const CLOCK_SKEW_TOLERANCE_MS: i64 = 1_000;

/// Merge action for one record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    PullToLocal,
    PushToRemote,
    InSync,
}

/// Decide the merge action for one version pair.
///
/// Ties and near-ties (within `skew_tolerance_ms`) deliberately favor no
/// action, so two sides syncing near-simultaneously with close-but-unequal
/// clocks do not thrash. A pair where neither side carries a recognizable
/// timestamp compares as equal and stays untouched even if content differs;
/// that is an accepted limitation of timestamp-only comparison.
pub fn decide_action(
    local: Option<&SyncRecord>,
    remote: Option<&SyncRecord>,
    skew_tolerance_ms: i64,
) -> SyncAction {
    match (local, remote) {
        (None, Some(_)) => SyncAction::PullToLocal,
        (Some(_), None) => SyncAction::PushToRemote,
        (Some(local), Some(remote)) => {
            let local_ts = extract_timestamp(local);
            let remote_ts = extract_timestamp(remote);
            if remote_ts > local_ts.saturating_add(skew_tolerance_ms) {
                SyncAction::PullToLocal
            } else if local_ts > remote_ts.saturating_add(skew_tolerance_ms) {
                SyncAction::PushToRemote
            } else {
                SyncAction::InSync
            }
        }
        // A key absent on both sides is never under consideration.
        (None, None) => SyncAction::InSync,
    }
}
