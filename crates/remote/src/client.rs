//! Remote record store client for the Trellis cloud record API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use trellis_core::sync::{RemoteRecordStore, SyncRecord};

use crate::error::{RemoteSyncError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchRecordsResponse {
    records: Vec<SyncRecord>,
}

/// Client for the Trellis cloud record API.
///
/// One collection maps to one REST resource; records are opaque JSON values
/// keyed by their `id` field.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl RemoteSyncClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the cloud API (e.g., "https://api.trellis.app")
    /// * `access_token` - Bearer token scoped to the authenticated owner
    pub fn new(base_url: &str, access_token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| RemoteSyncError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RemoteSyncError::api(
                    status.as_u16(),
                    format!("{}: {}", error.code, error.message),
                ));
            }
            return Err(RemoteSyncError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteSyncError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Check a response whose body carries nothing useful on success.
    async fn check_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if status.is_success() {
            return Ok(());
        }
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(RemoteSyncError::api(
                status.as_u16(),
                format!("{}: {}", error.code, error.message),
            ));
        }
        Err(RemoteSyncError::api(
            status.as_u16(),
            format!("Request failed: {}", body),
        ))
    }

    fn records_url(&self, collection: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/records",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    /// Fetch the full record set for an owner in one collection.
    ///
    /// GET /api/v1/collections/{collection}/records?ownerId={ownerId}
    pub async fn fetch_records(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<SyncRecord>> {
        let url = self.records_url(collection);
        debug!(
            "[RemoteSync] fetch_records collection={} owner={}",
            collection, owner_id
        );

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("ownerId", owner_id)])
            .send()
            .await?;

        let parsed: FetchRecordsResponse = Self::parse_response(response).await?;
        Ok(parsed.records)
    }

    /// Write one record keyed by its id.
    ///
    /// PUT /api/v1/collections/{collection}/records/{recordId}
    pub async fn put_record(
        &self,
        collection: &str,
        record_id: &str,
        record: &SyncRecord,
    ) -> Result<()> {
        if record_id.is_empty() {
            return Err(RemoteSyncError::invalid_request(
                "Record id must not be empty",
            ));
        }
        let url = format!(
            "{}/{}",
            self.records_url(collection),
            urlencoding::encode(record_id)
        );

        let response = self
            .client
            .put(&url)
            .headers(self.headers()?)
            .json(record)
            .send()
            .await?;

        Self::check_response(response).await
    }
}

#[async_trait]
impl RemoteRecordStore for RemoteSyncClient {
    async fn fetch_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> trellis_core::Result<Vec<SyncRecord>> {
        self.fetch_records(collection, owner_id)
            .await
            .map_err(Into::into)
    }

    async fn write_one(
        &self,
        collection: &str,
        record_id: &str,
        record: &SyncRecord,
    ) -> trellis_core::Result<()> {
        self.put_record(collection, record_id, record)
            .await
            .map_err(Into::into)
    }
}
