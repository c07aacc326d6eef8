// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the calls backend.
//!
//! The backend's payloads are loosely shaped (optional fields standing in
//! for a tagged union), so every response type here carries a `classify`
//! step that resolves it into the strict enums the reconciler consumes.

use serde::{Deserialize, Serialize};
use voxio_core::{CallStatus, PlaceCallOutcome, RecordingFetch, Segment, TranscriptFetch};

/// Raw transcript endpoint payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub aligned: Option<Vec<Segment>>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TranscriptResponse {
    /// Resolve the loose payload into the four-way union.
    ///
    /// Precedence: non-empty aligned segments, then non-empty plain text,
    /// then an explicit error (an `error` status or any `message`), then
    /// pending. An empty `aligned` array is treated as not-ready, never as
    /// a complete transcript.
    pub fn classify(self) -> TranscriptFetch {
        if let Some(aligned) = self.aligned.filter(|segments| !segments.is_empty()) {
            return TranscriptFetch::Aligned(aligned);
        }
        if let Some(text) = self.transcript.filter(|text| !text.is_empty()) {
            return TranscriptFetch::Text(text);
        }
        if self.status.as_deref() == Some("error") || self.message.is_some() {
            return TranscriptFetch::Failed(
                self.message
                    .unwrap_or_else(|| "Transcript error.".to_string()),
            );
        }
        TranscriptFetch::Pending
    }
}

/// Raw recording endpoint payload.
///
/// Some backend revisions send the URL as `url` instead of `recording_url`;
/// the alias accepts both.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "url")]
    pub recording_url: Option<String>,
}

impl RecordingResponse {
    /// A recording is ready only when the payload reports success and
    /// carries a non-empty URL.
    pub fn classify(self) -> RecordingFetch {
        match (self.status.as_deref(), self.recording_url) {
            (Some("success"), Some(url)) if !url.is_empty() => RecordingFetch::Ready(url),
            _ => RecordingFetch::NotReady,
        }
    }
}

/// Placement request body.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceCallRequest {
    pub phone_number: String,
    pub topic: String,
    /// Only attached for premium accounts, matching what the backend expects.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub premium: bool,
    pub max_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Placement response body.
///
/// The backend answers HTTP 200 both when a call was placed (`call_id`
/// present) and when it refused the topic server-side (`message` only).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceCallResponse {
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub status: Option<CallStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PlaceCallResponse {
    pub fn into_outcome(self) -> PlaceCallOutcome {
        PlaceCallOutcome {
            call_id: self.call_id,
            status: self.status,
            message: self.message,
        }
    }
}

/// Error body shape for non-success responses (`{"detail": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}
