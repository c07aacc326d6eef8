// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory view state and its merge rules.
//!
//! The merge functions here are the invariant-bearing part of the
//! reconciler: transcript data never regresses on a later failure, and a
//! stored recording URL is never changed. They are plain synchronous
//! methods so every rule can be unit tested without a runtime.

use std::collections::HashMap;

use voxio_core::{CallRecord, Segment, Speaker, TranscriptEntry, TranscriptFetch};

/// The reconciler's owned view of the calls backend.
///
/// The call list is replaced wholesale on every fetch (the backend is
/// authoritative for ordering and membership); the transcript and recording
/// maps accrete per call id.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerState {
    calls: Vec<CallRecord>,
    transcripts: HashMap<String, TranscriptEntry>,
    recordings: HashMap<String, String>,
}

impl ReconcilerState {
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn transcript(&self, call_id: &str) -> Option<&TranscriptEntry> {
        self.transcripts.get(call_id)
    }

    pub fn recording_url(&self, call_id: &str) -> Option<&str> {
        self.recordings.get(call_id).map(String::as_str)
    }

    /// Whether a transcript for this call is already complete.
    pub fn transcript_complete(&self, call_id: &str) -> bool {
        self.transcripts
            .get(call_id)
            .is_some_and(TranscriptEntry::is_complete)
    }

    /// Replace the call list wholesale with a fresh fetch result.
    pub fn replace_calls(&mut self, calls: Vec<CallRecord>) {
        self.calls = calls;
    }

    /// Apply a failed list fetch.
    ///
    /// Keeps the last good list unless `keep_history` is false, in which
    /// case the list empties until the next successful fetch.
    pub fn apply_list_failure(&mut self, keep_history: bool) {
        if !keep_history {
            self.calls.clear();
        }
    }

    /// Mark a transcript fetch for `call_id` as outstanding.
    pub fn begin_transcript_fetch(&mut self, call_id: &str) {
        self.transcripts
            .entry(call_id.to_string())
            .or_default()
            .loading = true;
    }

    /// Merge a classified transcript response for `call_id`.
    ///
    /// A reported failure records its message but leaves any previously
    /// stored segments untouched; a pending response leaves the entry
    /// loading for the next tick.
    pub fn apply_transcript(&mut self, call_id: &str, fetch: TranscriptFetch) {
        let entry = self.transcripts.entry(call_id.to_string()).or_default();
        match fetch {
            TranscriptFetch::Aligned(segments) => {
                entry.aligned = Some(segments);
                entry.loading = false;
                entry.error = None;
            }
            TranscriptFetch::Text(text) => {
                // A plain transcript becomes a single agent-side segment.
                entry.aligned = Some(vec![Segment {
                    speaker: Speaker::Agent,
                    text,
                }]);
                entry.loading = false;
                entry.error = None;
            }
            TranscriptFetch::Failed(message) => {
                entry.error = Some(message);
                entry.loading = false;
            }
            TranscriptFetch::Pending => {}
        }
    }

    /// Record a transport-level transcript failure for `call_id`.
    ///
    /// Same non-regression rule as a reported failure: the message lands in
    /// `error` and existing segments stay.
    pub fn fail_transcript(&mut self, call_id: &str, message: String) {
        let entry = self.transcripts.entry(call_id.to_string()).or_default();
        entry.error = Some(message);
        entry.loading = false;
    }

    /// Store a recording URL for `call_id`. First write wins; later
    /// responses never change a stored URL.
    pub fn set_recording(&mut self, call_id: &str, url: String) {
        self.recordings.entry(call_id.to_string()).or_insert(url);
    }
}
