// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock calls backend for deterministic testing.
//!
//! `MockCallsApi` implements `CallsApi` with scripted responses, enabling
//! fast, CI-runnable tests without a live backend.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use voxio_core::{
    CallOptions, CallRecord, CallsApi, Identity, PlaceCallOutcome, RecordingFetch,
    TranscriptFetch, VoxioError,
};

type Script<T> = VecDeque<Result<T, String>>;

/// A mock calls backend that returns scripted responses.
///
/// Each operation reads from its own FIFO script. While a script holds more
/// than one entry, entries are consumed in order; the last entry then
/// repeats forever, so a polled backend keeps answering after the script
/// runs out. Unscripted operations fall back to quiet defaults: an empty
/// call list, a pending transcript, a not-ready recording, and a placement
/// acknowledgement with a fresh call id.
///
/// Every fetch is counted, so tests can assert how often the reconciler
/// actually hit the backend. Artifact fetches also track how many are in
/// flight at once; with [`set_fetch_delay`](Self::set_fetch_delay) a
/// paused-clock test can hold fetches open so overlap becomes observable,
/// then read the high-water mark back via
/// [`peak_in_flight`](Self::peak_in_flight).
pub struct MockCallsApi {
    lists: Mutex<Script<Vec<CallRecord>>>,
    transcripts: Mutex<HashMap<String, Script<TranscriptFetch>>>,
    recordings: Mutex<HashMap<String, Script<RecordingFetch>>>,
    placements: Mutex<Script<PlaceCallOutcome>>,
    place_requests: Mutex<Vec<(String, String, CallOptions)>>,
    list_fetches: Mutex<usize>,
    transcript_fetches: Mutex<HashMap<String, usize>>,
    recording_fetches: Mutex<HashMap<String, usize>>,
    fetch_delay: Mutex<Duration>,
    in_flight: Mutex<usize>,
    peak_in_flight: Mutex<usize>,
}

impl MockCallsApi {
    /// Create a mock backend with nothing scripted.
    pub fn new() -> Self {
        Self {
            lists: Mutex::new(VecDeque::new()),
            transcripts: Mutex::new(HashMap::new()),
            recordings: Mutex::new(HashMap::new()),
            placements: Mutex::new(VecDeque::new()),
            place_requests: Mutex::new(Vec::new()),
            list_fetches: Mutex::new(0),
            transcript_fetches: Mutex::new(HashMap::new()),
            recording_fetches: Mutex::new(HashMap::new()),
            fetch_delay: Mutex::new(Duration::ZERO),
            in_flight: Mutex::new(0),
            peak_in_flight: Mutex::new(0),
        }
    }

    /// Script the next call list response.
    pub async fn queue_list(&self, calls: Vec<CallRecord>) {
        self.lists.lock().await.push_back(Ok(calls));
    }

    /// Script the next call list fetch to fail.
    pub async fn queue_list_error(&self, message: &str) {
        self.lists.lock().await.push_back(Err(message.to_string()));
    }

    /// Script the next transcript response for one call.
    pub async fn queue_transcript(&self, call_id: &str, fetch: TranscriptFetch) {
        self.transcripts
            .lock()
            .await
            .entry(call_id.to_string())
            .or_default()
            .push_back(Ok(fetch));
    }

    /// Script the next transcript fetch for one call to fail.
    pub async fn queue_transcript_error(&self, call_id: &str, message: &str) {
        self.transcripts
            .lock()
            .await
            .entry(call_id.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Script the next recording response for one call.
    pub async fn queue_recording(&self, call_id: &str, fetch: RecordingFetch) {
        self.recordings
            .lock()
            .await
            .entry(call_id.to_string())
            .or_default()
            .push_back(Ok(fetch));
    }

    /// Script the next recording fetch for one call to fail.
    pub async fn queue_recording_error(&self, call_id: &str, message: &str) {
        self.recordings
            .lock()
            .await
            .entry(call_id.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Hold every transcript and recording fetch open for `delay`.
    ///
    /// With a paused clock this keeps fetches pending until the runtime is
    /// otherwise idle, so concurrent fetches overlap instead of completing
    /// in the order they were polled.
    pub async fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().await = delay;
    }

    /// Script the next placement outcome.
    pub async fn queue_place_outcome(&self, outcome: PlaceCallOutcome) {
        self.placements.lock().await.push_back(Ok(outcome));
    }

    /// Script the next placement request to fail.
    pub async fn queue_place_error(&self, message: &str) {
        self.placements.lock().await.push_back(Err(message.to_string()));
    }

    /// How many times the call list was fetched.
    pub async fn list_fetch_count(&self) -> usize {
        *self.list_fetches.lock().await
    }

    /// How many times one call's transcript was fetched.
    pub async fn transcript_fetch_count(&self, call_id: &str) -> usize {
        self.transcript_fetches
            .lock()
            .await
            .get(call_id)
            .copied()
            .unwrap_or(0)
    }

    /// How many times one call's recording was fetched.
    pub async fn recording_fetch_count(&self, call_id: &str) -> usize {
        self.recording_fetches
            .lock()
            .await
            .get(call_id)
            .copied()
            .unwrap_or(0)
    }

    /// How many placement requests reached the backend.
    pub async fn place_count(&self) -> usize {
        self.place_requests.lock().await.len()
    }

    /// Every placement request received, in order.
    pub async fn place_requests(&self) -> Vec<(String, String, CallOptions)> {
        self.place_requests.lock().await.clone()
    }

    /// The most transcript and recording fetches that were in flight at once.
    pub async fn peak_in_flight(&self) -> usize {
        *self.peak_in_flight.lock().await
    }

    async fn begin_fetch(&self) {
        let mut in_flight = self.in_flight.lock().await;
        *in_flight += 1;
        let mut peak = self.peak_in_flight.lock().await;
        *peak = (*peak).max(*in_flight);
        drop(peak);
        drop(in_flight);
        let delay = *self.fetch_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn end_fetch(&self) {
        *self.in_flight.lock().await -= 1;
    }
}

impl Default for MockCallsApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume in order while entries remain, then repeat the last entry.
fn next_scripted<T: Clone>(script: &mut Script<T>) -> Option<Result<T, String>> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

fn api_error(message: String) -> VoxioError {
    VoxioError::Api {
        message,
        source: None,
    }
}

#[async_trait]
impl CallsApi for MockCallsApi {
    async fn list_calls(&self, _identity: &Identity) -> Result<Vec<CallRecord>, VoxioError> {
        *self.list_fetches.lock().await += 1;
        match next_scripted(&mut *self.lists.lock().await) {
            Some(Ok(calls)) => Ok(calls),
            Some(Err(message)) => Err(api_error(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn get_transcript(&self, call_id: &str) -> Result<TranscriptFetch, VoxioError> {
        *self
            .transcript_fetches
            .lock()
            .await
            .entry(call_id.to_string())
            .or_insert(0) += 1;
        self.begin_fetch().await;
        let result = {
            let mut scripts = self.transcripts.lock().await;
            match scripts.get_mut(call_id).and_then(next_scripted) {
                Some(Ok(fetch)) => Ok(fetch),
                Some(Err(message)) => Err(api_error(message)),
                None => Ok(TranscriptFetch::Pending),
            }
        };
        self.end_fetch().await;
        result
    }

    async fn get_recording(&self, call_id: &str) -> Result<RecordingFetch, VoxioError> {
        *self
            .recording_fetches
            .lock()
            .await
            .entry(call_id.to_string())
            .or_insert(0) += 1;
        self.begin_fetch().await;
        let result = {
            let mut scripts = self.recordings.lock().await;
            match scripts.get_mut(call_id).and_then(next_scripted) {
                Some(Ok(fetch)) => Ok(fetch),
                Some(Err(message)) => Err(api_error(message)),
                None => Ok(RecordingFetch::NotReady),
            }
        };
        self.end_fetch().await;
        result
    }

    async fn place_call(
        &self,
        phone_number: &str,
        topic: &str,
        options: &CallOptions,
    ) -> Result<PlaceCallOutcome, VoxioError> {
        self.place_requests.lock().await.push((
            phone_number.to_string(),
            topic.to_string(),
            options.clone(),
        ));
        match next_scripted(&mut *self.placements.lock().await) {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(api_error(message)),
            None => Ok(PlaceCallOutcome {
                call_id: Some(uuid::Uuid::new_v4().to_string()),
                status: None,
                message: Some("call queued".to_string()),
            }),
        }
    }
}
