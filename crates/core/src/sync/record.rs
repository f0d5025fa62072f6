//! Schema-free sync records and timestamp extraction.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Candidate timestamp fields, checked in priority order. The first field
/// present wins even when its value turns out to be unparseable.
const TIMESTAMP_FIELDS: [&str; 4] = ["lastModified", "updatedAt", "createdAt", "timestamp"];

/// An opaque record as exchanged between both stores.
///
/// Beyond `id` and `ownerId` the engine makes no structural assumptions;
/// everything else travels in `fields` untouched. Serde round-tripping is
/// what strips non-serializable values before local persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub id: String,
    pub owner_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SyncRecord {
    /// Create a record with no extra fields.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            fields: Map::new(),
        }
    }

    /// Set one opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Derive a single comparable instant (epoch milliseconds) from a record.
///
/// Total and deterministic: a record with no recognized timestamp field, or
/// with a malformed value, yields zero and is treated as maximally stale.
/// Never a reason to overwrite a present counterpart.
pub fn extract_timestamp(record: &SyncRecord) -> i64 {
    for field in TIMESTAMP_FIELDS {
        if let Some(value) = record.fields.get(field) {
            return timestamp_from_value(value);
        }
    }
    0
}

fn timestamp_from_value(value: &Value) -> i64 {
    match value {
        // Native date value: epoch milliseconds.
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|v| v as i64))
            .unwrap_or(0),
        Value::String(text) => parse_datetime_millis(text),
        // Remote-native timestamp serialization: separate whole-second and
        // sub-second components, public or private field names.
        Value::Object(map) => {
            let seconds = component(map, "seconds").or_else(|| component(map, "_seconds"));
            match seconds {
                Some(seconds) => {
                    let nanos = component(map, "nanoseconds")
                        .or_else(|| component(map, "_nanoseconds"))
                        .unwrap_or(0);
                    seconds
                        .saturating_mul(1_000)
                        .saturating_add(nanos / 1_000_000)
                }
                None => 0,
            }
        }
        _ => 0,
    }
}

fn component(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(Value::as_i64)
}

fn parse_datetime_millis(text: &str) -> i64 {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.timestamp_millis();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return parsed.timestamp_millis();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return parsed.and_utc().timestamp_millis();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return parsed
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with(key: &str, value: Value) -> SyncRecord {
        SyncRecord::new("r1", "owner-1").with_field(key, value)
    }

    #[test]
    fn extracts_epoch_millis_number() {
        let record = record_with("updatedAt", json!(1_700_000_000_000_i64));
        assert_eq!(extract_timestamp(&record), 1_700_000_000_000);
    }

    #[test]
    fn extracts_seconds_and_nanoseconds_object() {
        let record = record_with(
            "lastModified",
            json!({ "seconds": 1_700_000_000_i64, "nanoseconds": 500_000_000_i64 }),
        );
        assert_eq!(extract_timestamp(&record), 1_700_000_000_500);
    }

    #[test]
    fn extracts_private_component_names() {
        let record = record_with(
            "createdAt",
            json!({ "_seconds": 1_700_000_000_i64, "_nanoseconds": 250_000_000_i64 }),
        );
        assert_eq!(extract_timestamp(&record), 1_700_000_000_250);
    }

    #[test]
    fn extracts_rfc3339_string() {
        let record = record_with("updatedAt", json!("2023-11-14T22:13:20.000Z"));
        assert_eq!(extract_timestamp(&record), 1_700_000_000_000);
    }

    #[test]
    fn field_priority_is_fixed() {
        let record = SyncRecord::new("r1", "owner-1")
            .with_field("createdAt", json!(1_000))
            .with_field("lastModified", json!(3_000))
            .with_field("updatedAt", json!(2_000));
        assert_eq!(extract_timestamp(&record), 3_000);
    }

    #[test]
    fn first_present_field_wins_even_when_malformed() {
        // lastModified is garbage; the extractor must not fall through to
        // the valid updatedAt candidate.
        let record = SyncRecord::new("r1", "owner-1")
            .with_field("lastModified", json!("not a date"))
            .with_field("updatedAt", json!(2_000));
        assert_eq!(extract_timestamp(&record), 0);
    }

    #[test]
    fn missing_timestamp_fields_yield_zero() {
        let record = SyncRecord::new("r1", "owner-1").with_field("title", json!("A"));
        assert_eq!(extract_timestamp(&record), 0);
    }

    #[test]
    fn malformed_values_yield_zero() {
        for value in [json!(null), json!(true), json!([1, 2]), json!({ "nanos": 5 })] {
            let record = record_with("timestamp", value);
            assert_eq!(extract_timestamp(&record), 0);
        }
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = SyncRecord::new("card-9", "owner-1")
            .with_field("title", json!("Groceries"))
            .with_field("updatedAt", json!(42));
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], "card-9");
        assert_eq!(json["ownerId"], "owner-1");
        assert_eq!(json["title"], "Groceries");
        let back: SyncRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, record);
    }
}
