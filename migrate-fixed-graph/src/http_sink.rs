//! HTTP bulk-write sink with bounded throttle retry

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use graph_migration::{
    BulkSink, BulkWriteResponse, FieldNames, GraphElement, MigrationError, MigrationResult,
    SinkInfo,
};

/// Response header carrying the cost units a bulk write consumed.
const COST_UNITS_HEADER: &str = "x-cost-units";

/// Posts element batches as JSON documents to a bulk endpoint.
///
/// Throttled responses (429/503) are retried with linear backoff up to
/// `max_retries` attempts; any other error status is terminal.
pub struct HttpBulkSink {
    client: reqwest::Client,
    base_url: String,
    fields: FieldNames,
    max_retries: u32,
}

impl HttpBulkSink {
    /// Create a sink against `base_url`.
    #[must_use]
    pub fn new(base_url: String, fields: FieldNames, max_retries: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fields,
            max_retries,
        }
    }
}

#[async_trait]
impl BulkSink for HttpBulkSink {
    async fn initialize(&mut self) -> MigrationResult<SinkInfo> {
        let url = format!("{}/collection", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MigrationError::SinkFailure(format!("collection lookup failed: {e}")))?;
        if !response.status().is_success() {
            return Err(MigrationError::SinkFailure(format!(
                "collection lookup returned {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| MigrationError::SinkFailure(format!("collection metadata: {e}")))?;
        let partition_key_path = body
            .get("partitionKeyPath")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        Ok(SinkInfo { partition_key_path })
    }

    async fn bulk_write(
        &mut self,
        elements: Vec<GraphElement>,
        upsert: bool,
    ) -> MigrationResult<BulkWriteResponse> {
        let documents: Vec<Value> = elements
            .iter()
            .map(|el| Value::Object(el.to_document(&self.fields)))
            .collect();
        let written = documents.len() as u64;
        let url = format!("{}/bulk?upsert={upsert}", self.base_url);
        let started = Instant::now();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&url)
                .json(&documents)
                .send()
                .await
                .map_err(|e| {
                    MigrationError::SinkFailure(format!("bulk write request failed: {e}"))
                })?;

            let status = response.status();
            if status.is_success() {
                let cost_units = response
                    .headers()
                    .get(COST_UNITS_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0);
                return Ok(BulkWriteResponse {
                    written,
                    elapsed: started.elapsed(),
                    cost_units,
                });
            }

            if is_throttled(status) && attempt <= self.max_retries {
                tracing::warn!(attempt, status = %status, "bulk write throttled, backing off");
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                continue;
            }

            return Err(MigrationError::SinkFailure(format!(
                "bulk write returned {status} after {attempt} attempts"
            )));
        }
    }
}

fn is_throttled(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}
