//! Database model for stored sync records.

use chrono::Utc;
use diesel::prelude::*;

use trellis_core::sync::SyncRecord;
use trellis_core::Result;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(collection, id))]
#[diesel(table_name = crate::schema::records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordRowDB {
    pub collection: String,
    pub id: String,
    pub owner_id: String,
    pub payload: String,
    pub stored_at: String,
}

impl RecordRowDB {
    /// Build a row from a record, serializing the full record as the payload.
    pub fn from_record(collection: &str, record: &SyncRecord) -> Result<Self> {
        Ok(Self {
            collection: collection.to_string(),
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            payload: serde_json::to_string(record)?,
            stored_at: Utc::now().to_rfc3339(),
        })
    }

    pub fn into_record(self) -> Result<SyncRecord> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}
