// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The boundary trait between the reconciler and the calls backend.

use async_trait::async_trait;

use crate::error::VoxioError;
use crate::types::{
    CallOptions, CallRecord, Identity, PlaceCallOutcome, RecordingFetch, TranscriptFetch,
};

/// Thin typed surface over the external calls backend.
///
/// The reconciler holds this as `Arc<dyn CallsApi>`; the production
/// implementation is an HTTP client, tests substitute a scripted mock.
/// Every method is a single logical fetch with no cross-call state, so a
/// failure in one call's fetch never implies anything about another's.
#[async_trait]
pub trait CallsApi: Send + Sync {
    /// Fetch the current call list for `identity`.
    ///
    /// The collaborator is authoritative for ordering and membership; the
    /// caller is expected to replace its local list wholesale with the
    /// result. Returns `Err` on transport or decode failure so the caller
    /// can decide whether to keep its last good list.
    async fn list_calls(&self, identity: &Identity) -> Result<Vec<CallRecord>, VoxioError>;

    /// Fetch and classify the transcript for one call.
    ///
    /// A well-formed "not ready yet" payload is `Ok(TranscriptFetch::Pending)`,
    /// and a collaborator-reported transcript error is
    /// `Ok(TranscriptFetch::Failed(..))`; `Err` is reserved for transport
    /// and decode failures.
    async fn get_transcript(&self, call_id: &str) -> Result<TranscriptFetch, VoxioError>;

    /// Fetch the recording URL for one call, if available yet.
    async fn get_recording(&self, call_id: &str) -> Result<RecordingFetch, VoxioError>;

    /// Request a new call.
    ///
    /// A refusal the backend reports in-band (HTTP 200 with a `message` and
    /// no `call_id`) is a successful outcome with `placed() == false`, not
    /// an `Err`.
    async fn place_call(
        &self,
        phone_number: &str,
        topic: &str,
        options: &CallOptions,
    ) -> Result<PlaceCallOutcome, VoxioError>;
}
