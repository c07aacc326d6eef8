// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`CallsApi`].
//!
//! Provides [`CallsClient`] which handles request construction, transient
//! error retry for reads, and classification of the backend's loose
//! payloads into the strict types the reconciler consumes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};
use voxio_config::ApiConfig;
use voxio_core::{
    CallOptions, CallRecord, CallsApi, Identity, PlaceCallOutcome, RecordingFetch,
    TranscriptFetch, VoxioError,
};

use crate::types::{ApiErrorBody, PlaceCallRequest, PlaceCallResponse, RecordingResponse, TranscriptResponse};

/// HTTP client for the calls backend.
///
/// Manages connection pooling and retry logic for transient statuses
/// (429, 500, 502, 503, 504) on read requests. Placement requests are
/// never retried: re-POSTing a placement can dial a phone twice.
#[derive(Debug, Clone)]
pub struct CallsClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    prefer_corrected: bool,
}

impl CallsClient {
    /// Creates a new calls-backend client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, VoxioError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoxioError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            prefer_corrected: config.prefer_corrected,
        })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// On transient statuses, retries after a 1-second delay up to
    /// `max_retries` extra attempts.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, VoxioError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| VoxioError::Api {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| VoxioError::Api {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| VoxioError::Api {
                    message: format!("failed to parse backend response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(VoxioError::Api {
                    message: format!("backend returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| VoxioError::Api {
            message: "request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl CallsApi for CallsClient {
    async fn list_calls(&self, identity: &Identity) -> Result<Vec<CallRecord>, VoxioError> {
        // A signed-in user fetches by user id and ignores the phone number;
        // a guest fetches by phone number alone.
        if let Some(user_id) = &identity.user_id {
            let url = reqwest::Url::parse_with_params(
                &format!("{}/history", self.base_url),
                &[("user_id", user_id.as_str())],
            )
            .map_err(|e| VoxioError::Config(format!("invalid api.base_url: {e}")))?;
            return self.get_json(url.into()).await;
        }
        if let Some(phone) = &identity.phone_number {
            return self
                .get_json(format!("{}/history/{}", self.base_url, phone))
                .await;
        }
        Err(VoxioError::Config(
            "history fetch requires a phone number or a user id".into(),
        ))
    }

    async fn get_transcript(&self, call_id: &str) -> Result<TranscriptFetch, VoxioError> {
        if self.prefer_corrected {
            let url = format!("{}/call_corrected_transcript/{}", self.base_url, call_id);
            match self.get_json::<TranscriptResponse>(url).await {
                Ok(response) => return Ok(response.classify()),
                // Fall back to the raw transcript only on a failed fetch;
                // a well-formed pending payload is returned as-is above.
                Err(e) => {
                    debug!(call_id, error = %e, "corrected transcript unavailable, falling back")
                }
            }
        }

        let url = format!("{}/call_transcript/{}", self.base_url, call_id);
        let response: TranscriptResponse = self.get_json(url).await?;
        Ok(response.classify())
    }

    async fn get_recording(&self, call_id: &str) -> Result<RecordingFetch, VoxioError> {
        let url = format!("{}/call_recording/{}", self.base_url, call_id);
        let response: RecordingResponse = self.get_json(url).await?;
        Ok(response.classify())
    }

    async fn place_call(
        &self,
        phone_number: &str,
        topic: &str,
        options: &CallOptions,
    ) -> Result<PlaceCallOutcome, VoxioError> {
        let request = PlaceCallRequest {
            phone_number: phone_number.to_string(),
            topic: topic.to_string(),
            premium: options.premium,
            max_time: options.max_duration_secs,
            user_id: options.user_id.clone(),
        };

        // No retry loop here: placement is not idempotent.
        let response = self
            .client
            .post(format!("{}/call", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| VoxioError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, phone_number, "placement response received");

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let parsed: PlaceCallResponse =
            serde_json::from_str(&body).map_err(|e| VoxioError::Api {
                message: format!("failed to parse placement response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(parsed.into_outcome())
    }
}

/// Build an API error from a non-success response, preferring the backend's
/// `{"detail": ...}` body when it parses.
fn api_error(status: reqwest::StatusCode, body: &str) -> VoxioError {
    let message = if let Ok(err_body) = serde_json::from_str::<ApiErrorBody>(body) {
        format!("backend error ({status}): {}", err_body.detail)
    } else {
        format!("backend returned {status}: {body}")
    };
    VoxioError::Api {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
