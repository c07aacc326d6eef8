// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling and reconciliation loop for the Voxio call poller.
//!
//! [`Reconciler`] keeps an in-memory view of call history, transcripts, and
//! recordings eventually consistent with the calls backend by periodic
//! polling, and drives the placement flow (allowance check, moderation
//! screen, request, immediate refresh). All merge rules live in
//! [`state::ReconcilerState`]; this module owns scheduling and fetch
//! orchestration.

pub mod shutdown;
pub mod state;

pub use state::ReconcilerState;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::{Notify, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voxio_config::{CallConfig, PollerConfig, VoxioConfig};
use voxio_core::{
    CallOptions, CallsApi, Identity, PlaceCallOutcome, RecordingFetch, TranscriptFetch,
    VoxioError,
};
use voxio_moderation::Verdict;

/// Drives the periodic fetch-and-merge loop against the calls backend.
///
/// One instance owns the view state for one identity. The loop joins every
/// per-call fetch it starts before the tick returns, so work from two ticks
/// never overlaps for the same call.
pub struct Reconciler {
    api: Arc<dyn CallsApi>,
    state: Arc<RwLock<ReconcilerState>>,
    identity: Identity,
    poller: PollerConfig,
    call: CallConfig,
    refresh: Notify,
}

impl Reconciler {
    /// Build a reconciler from configuration.
    ///
    /// Fails when the configured identity has neither a phone number nor a
    /// user id, since there would be nothing to poll.
    pub fn new(api: Arc<dyn CallsApi>, config: &VoxioConfig) -> Result<Self, VoxioError> {
        let identity = config.identity.to_identity();
        if identity.is_empty() {
            return Err(VoxioError::Config(
                "polling requires identity.phone_number or identity.user_id".into(),
            ));
        }

        Ok(Self {
            api,
            state: Arc::new(RwLock::new(ReconcilerState::default())),
            identity,
            poller: config.poller.clone(),
            call: config.call.clone(),
            refresh: Notify::new(),
        })
    }

    /// Shared handle to the reconciler's view state.
    pub fn state(&self) -> Arc<RwLock<ReconcilerState>> {
        Arc::clone(&self.state)
    }

    /// Clone of the current view state.
    pub async fn snapshot(&self) -> ReconcilerState {
        self.state.read().await.clone()
    }

    /// Run the polling loop until `cancel` fires.
    ///
    /// The first pass runs immediately; afterwards passes fire on the
    /// configured interval, plus an out-of-band list refresh whenever a
    /// placement succeeds. A pass that outlasts the interval delays the
    /// next one rather than letting work pile up.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_millis(self.poller.interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.poller.interval_ms, "reconciler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = self.refresh.notified() => {
                    debug!("out-of-band refresh requested");
                    self.refresh_list().await;
                }
                _ = cancel.cancelled() => {
                    info!("reconciler stopping");
                    break;
                }
            }
        }
    }

    /// One reconciliation pass: refresh the list, then fetch artifacts for
    /// every eligible call with bounded concurrency, joining all of it.
    pub async fn tick(&self) {
        self.refresh_list().await;

        let eligible = self.eligible_calls().await;
        if eligible.is_empty() {
            return;
        }

        debug!(count = eligible.len(), "fetching artifacts for finished calls");
        stream::iter(eligible)
            .for_each_concurrent(self.poller.max_concurrent_fetches, |call_id| async move {
                self.sync_call(&call_id).await;
            })
            .await;
    }

    /// Refetch the call list once.
    ///
    /// On failure the configured policy decides whether the last good list
    /// survives or the view empties.
    pub async fn refresh_list(&self) {
        match self.api.list_calls(&self.identity).await {
            Ok(calls) => {
                debug!(count = calls.len(), "call list fetched");
                self.state.write().await.replace_calls(calls);
            }
            Err(e) => {
                warn!(error = %e, "call list fetch failed");
                self.state
                    .write()
                    .await
                    .apply_list_failure(self.poller.keep_history_on_error);
            }
        }
    }

    /// Run the full placement flow: allowance check, moderation screen,
    /// placement request, and (on success) an immediate out-of-band list
    /// refresh.
    pub async fn place_call(
        &self,
        phone_number: &str,
        topic: &str,
    ) -> Result<PlaceCallOutcome, VoxioError> {
        if !self.call.premium {
            let used = self.state.read().await.calls().len();
            if used >= self.call.max_calls {
                return Err(VoxioError::CallLimit {
                    used,
                    max: self.call.max_calls,
                });
            }
        }

        if let Verdict::Rejected(reason) =
            voxio_moderation::screen_topic(topic, self.call.premium)
        {
            return Err(VoxioError::Rejected { reason });
        }

        let options = CallOptions {
            premium: self.call.premium,
            max_duration_secs: if self.call.premium {
                self.call.premium_max_duration_secs
            } else {
                self.call.max_duration_secs
            },
            user_id: self.identity.user_id.clone(),
        };

        let outcome = self.api.place_call(phone_number, topic, &options).await?;

        if let Some(call_id) = &outcome.call_id {
            info!(call_id = %call_id, "call placed");
            self.refresh.notify_one();
        } else if let Some(message) = &outcome.message {
            warn!(message = %message, "placement refused by backend");
        }

        Ok(outcome)
    }

    /// Calls whose artifacts are worth fetching this pass: terminal-success
    /// status with an assigned call id. Unless configured otherwise, calls
    /// whose transcript is complete and recording stored are skipped.
    async fn eligible_calls(&self) -> Vec<String> {
        let state = self.state.read().await;
        state
            .calls()
            .iter()
            .filter(|call| call.status.is_terminal_success())
            .filter_map(|call| call.call_id.clone())
            .filter(|id| {
                self.poller.refetch_completed
                    || !(state.transcript_complete(id) && state.recording_url(id).is_some())
            })
            .collect()
    }

    /// Fetch transcript and recording for one finished call.
    ///
    /// The two fetches are independent; a transcript failure never blocks
    /// the recording fetch. Neither lock is held across an API call.
    async fn sync_call(&self, call_id: &str) {
        let fetch_transcript =
            self.poller.refetch_completed || !self.state.read().await.transcript_complete(call_id);

        if fetch_transcript {
            self.state.write().await.begin_transcript_fetch(call_id);
            match self.api.get_transcript(call_id).await {
                Ok(fetch) => {
                    match &fetch {
                        TranscriptFetch::Aligned(segments) => {
                            info!(call_id, segments = segments.len(), "transcript stored")
                        }
                        TranscriptFetch::Text(_) => info!(call_id, "plain transcript stored"),
                        TranscriptFetch::Pending => debug!(call_id, "transcript not ready"),
                        TranscriptFetch::Failed(message) => {
                            warn!(call_id, message = %message, "transcript reported failed")
                        }
                    }
                    self.state.write().await.apply_transcript(call_id, fetch);
                }
                Err(e) => {
                    warn!(call_id, error = %e, "transcript fetch failed");
                    self.state
                        .write()
                        .await
                        .fail_transcript(call_id, e.to_string());
                }
            }
        }

        if self.state.read().await.recording_url(call_id).is_none() {
            match self.api.get_recording(call_id).await {
                Ok(RecordingFetch::Ready(url)) => {
                    info!(call_id, "recording available");
                    self.state.write().await.set_recording(call_id, url);
                }
                Ok(RecordingFetch::NotReady) => {}
                // Recording failures stay silent; the next pass retries.
                Err(e) => debug!(call_id, error = %e, "recording fetch failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxio_core::{CallRecord, CallStatus, Segment, Speaker};
    use voxio_test_utils::MockCallsApi;

    fn record(call_id: &str, status: CallStatus) -> CallRecord {
        CallRecord {
            call_id: Some(call_id.to_string()),
            phone_number: Some("5551234567".to_string()),
            topic: "ask about billing".to_string(),
            status,
            call_time: None,
        }
    }

    fn segment(text: &str) -> Segment {
        Segment {
            speaker: Speaker::Agent,
            text: text.to_string(),
        }
    }

    fn guest_config() -> VoxioConfig {
        let mut config = VoxioConfig::default();
        config.identity.phone_number = Some("5551234567".to_string());
        config
    }

    fn reconciler(api: &Arc<MockCallsApi>, config: &VoxioConfig) -> Reconciler {
        Reconciler::new(Arc::clone(api) as Arc<dyn CallsApi>, config).unwrap()
    }

    #[tokio::test]
    async fn new_rejects_empty_identity() {
        let api = Arc::new(MockCallsApi::new());
        let config = VoxioConfig::default();
        let result = Reconciler::new(api as Arc<dyn CallsApi>, &config);
        assert!(matches!(result, Err(VoxioError::Config(_))));
    }

    #[tokio::test]
    async fn pending_calls_never_fetch_artifacts() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c1", CallStatus::Pending)]).await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;

        assert_eq!(api.transcript_fetch_count("c1").await, 0);
        assert_eq!(api.recording_fetch_count("c1").await, 0);
    }

    #[tokio::test]
    async fn finished_calls_without_id_are_skipped() {
        let api = Arc::new(MockCallsApi::new());
        let mut call = record("unused", CallStatus::Success);
        call.call_id = None;
        api.queue_list(vec![call]).await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;

        assert_eq!(api.transcript_fetch_count("unused").await, 0);
    }

    #[tokio::test]
    async fn per_call_failure_is_isolated() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![
            record("c3", CallStatus::Success),
            record("c4", CallStatus::Success),
        ])
        .await;
        api.queue_transcript_error("c3", "backend down").await;
        api.queue_transcript("c4", TranscriptFetch::Aligned(vec![segment("fine")]))
            .await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;

        let state = r.snapshot().await;
        assert!(state.transcript_complete("c4"));
        assert!(state.transcript("c3").unwrap().error.is_some());
        // The failing call's recording fetch still went out too.
        assert_eq!(api.recording_fetch_count("c3").await, 1);
        assert_eq!(api.recording_fetch_count("c4").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_bounds_concurrent_artifact_fetches() {
        let api = Arc::new(MockCallsApi::new());
        // Hold each fetch open so overlapping fetches are observable.
        api.set_fetch_delay(Duration::from_millis(5)).await;
        let calls: Vec<CallRecord> = (1..=6)
            .map(|n| record(&format!("c{n}"), CallStatus::Success))
            .collect();
        api.queue_list(calls).await;

        let mut config = guest_config();
        config.poller.max_concurrent_fetches = 2;

        let r = reconciler(&api, &config);
        r.tick().await;

        // Six eligible calls, never more than two fetches in flight.
        assert_eq!(api.peak_in_flight().await, 2);
        for n in 1..=6 {
            assert_eq!(api.transcript_fetch_count(&format!("c{n}")).await, 1);
        }
    }

    #[tokio::test]
    async fn complete_calls_are_not_refetched() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c1", CallStatus::Success)]).await;
        api.queue_transcript("c1", TranscriptFetch::Aligned(vec![segment("hello")]))
            .await;
        api.queue_recording("c1", RecordingFetch::Ready("https://r/a.mp3".into()))
            .await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;
        r.tick().await;
        r.tick().await;

        assert_eq!(api.transcript_fetch_count("c1").await, 1);
        assert_eq!(api.recording_fetch_count("c1").await, 1);
        assert_eq!(
            r.snapshot().await.recording_url("c1"),
            Some("https://r/a.mp3")
        );
    }

    #[tokio::test]
    async fn incomplete_transcript_keeps_polling() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c1", CallStatus::Success)]).await;
        api.queue_transcript("c1", TranscriptFetch::Pending).await;
        api.queue_transcript("c1", TranscriptFetch::Aligned(vec![segment("done")]))
            .await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;
        assert!(r.snapshot().await.transcript("c1").unwrap().loading);

        r.tick().await;
        assert!(r.snapshot().await.transcript_complete("c1"));
        assert_eq!(api.transcript_fetch_count("c1").await, 2);
    }

    #[tokio::test]
    async fn refetch_failure_never_regresses_transcript() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c2", CallStatus::Success)]).await;
        api.queue_transcript("c2", TranscriptFetch::Aligned(vec![segment("seg1")]))
            .await;
        api.queue_transcript_error("c2", "flaky network").await;

        let mut config = guest_config();
        config.poller.refetch_completed = true;

        let r = reconciler(&api, &config);
        r.tick().await;
        r.tick().await;

        assert_eq!(api.transcript_fetch_count("c2").await, 2);
        let state = r.snapshot().await;
        let entry = state.transcript("c2").unwrap();
        assert_eq!(entry.aligned.as_ref().unwrap()[0].text, "seg1");
        assert!(entry.error.is_some());
    }

    #[tokio::test]
    async fn list_failure_keeps_last_good_list_by_default() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c1", CallStatus::Success)]).await;
        api.queue_list_error("gateway timeout").await;
        api.queue_transcript("c1", TranscriptFetch::Pending).await;

        let r = reconciler(&api, &guest_config());
        r.tick().await;
        r.tick().await;

        assert_eq!(r.snapshot().await.calls().len(), 1);
        // Per-call work continued against the kept list on the failing tick.
        assert_eq!(api.transcript_fetch_count("c1").await, 2);
    }

    #[tokio::test]
    async fn list_failure_empties_list_when_configured() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![record("c1", CallStatus::Success)]).await;
        api.queue_list_error("gateway timeout").await;

        let mut config = guest_config();
        config.poller.keep_history_on_error = false;

        let r = reconciler(&api, &config);
        r.tick().await;
        assert_eq!(r.snapshot().await.calls().len(), 1);

        r.tick().await;
        assert!(r.snapshot().await.calls().is_empty());
    }

    #[tokio::test]
    async fn placement_is_refused_when_allowance_is_spent() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![
            record("c1", CallStatus::Success),
            record("c2", CallStatus::Failed),
            record("c3", CallStatus::Pending),
        ])
        .await;

        let r = reconciler(&api, &guest_config());
        r.refresh_list().await;

        let err = r.place_call("5551234567", "ask about billing").await;
        assert!(matches!(err, Err(VoxioError::CallLimit { used: 3, max: 3 })));
        assert_eq!(api.place_count().await, 0);
    }

    #[tokio::test]
    async fn placement_screens_the_topic() {
        let api = Arc::new(MockCallsApi::new());
        let r = reconciler(&api, &guest_config());

        let err = r.place_call("5551234567", "bomb").await;
        match err {
            Err(VoxioError::Rejected { reason }) => {
                assert!(reason.contains("prohibited content"), "got: {reason}")
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(api.place_count().await, 0);
    }

    #[tokio::test]
    async fn premium_skips_allowance_and_screen() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![
            record("c1", CallStatus::Success),
            record("c2", CallStatus::Success),
            record("c3", CallStatus::Success),
        ])
        .await;

        let mut config = guest_config();
        config.call.premium = true;

        let r = reconciler(&api, &config);
        r.refresh_list().await;

        let outcome = r.place_call("5551234567", "bomb").await.unwrap();
        assert!(outcome.placed());

        let requests = api.place_requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].2.premium);
        assert_eq!(requests[0].2.max_duration_secs, 180);
    }

    #[tokio::test]
    async fn regular_placement_uses_standard_duration_cap() {
        let api = Arc::new(MockCallsApi::new());
        let mut config = guest_config();
        config.identity.user_id = Some("user-42".to_string());

        let r = reconciler(&api, &config);
        let outcome = r.place_call("5551234567", "ask about billing").await.unwrap();
        assert!(outcome.placed());

        let requests = api.place_requests().await;
        let (phone, topic, options) = &requests[0];
        assert_eq!(phone, "5551234567");
        assert_eq!(topic, "ask about billing");
        assert!(!options.premium);
        assert_eq!(options.max_duration_secs, 60);
        assert_eq!(options.user_id.as_deref(), Some("user-42"));
    }

    #[tokio::test]
    async fn placement_triggers_out_of_band_refresh() {
        let api = Arc::new(MockCallsApi::new());
        api.queue_list(vec![]).await;
        api.queue_list(vec![record("abc123", CallStatus::Pending)])
            .await;

        let mut config = guest_config();
        // Long interval so only the immediate first pass and the refresh run.
        config.poller.interval_ms = 60_000;

        let r = Arc::new(reconciler(&api, &config));
        let cancel = CancellationToken::new();
        let run = tokio::spawn({
            let r = Arc::clone(&r);
            let cancel = cancel.clone();
            async move { r.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.list_fetch_count().await, 1);

        let outcome = r.place_call("5551234567", "ask about billing").await.unwrap();
        assert!(outcome.placed());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.list_fetch_count().await, 2);
        assert_eq!(r.snapshot().await.calls().len(), 1);

        cancel.cancel();
        run.await.unwrap();
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let api = Arc::new(MockCallsApi::new());
        let r = Arc::new(reconciler(&api, &guest_config()));
        let cancel = CancellationToken::new();

        let run = tokio::spawn({
            let r = Arc::clone(&r);
            let cancel = cancel.clone();
            async move { r.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        run.await.unwrap();
    }
}
