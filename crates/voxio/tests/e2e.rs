// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Voxio polling pipeline.
//!
//! Each test creates an isolated TestHarness with a scripted mock backend.
//! Tests are independent and order-insensitive. The final test runs the
//! real HTTP client against a wiremock server to cover the wire formats.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use voxio_core::{
    CallRecord, CallStatus, CallsApi, PlaceCallOutcome, RecordingFetch, Segment, Speaker,
    TranscriptFetch,
};
use voxio_test_utils::TestHarness;

fn record(call_id: &str, status: CallStatus) -> CallRecord {
    CallRecord {
        call_id: Some(call_id.to_string()),
        phone_number: Some("5551234567".to_string()),
        topic: "ask about billing".to_string(),
        status,
        call_time: None,
    }
}

fn segment(speaker: Speaker, text: &str) -> Segment {
    Segment {
        speaker,
        text: text.to_string(),
    }
}

// ---- Test 1: Recording URLs are write-once ----

#[tokio::test]
async fn test_recording_url_is_never_overwritten() {
    let harness = TestHarness::builder().with_refetch_completed().build().unwrap();
    harness.api.queue_list(vec![record("c1", CallStatus::Success)]).await;
    harness
        .api
        .queue_recording("c1", RecordingFetch::Ready("https://r/A.mp3".to_string()))
        .await;
    harness
        .api
        .queue_recording("c1", RecordingFetch::Ready("https://r/B.mp3".to_string()))
        .await;

    harness.tick().await;
    harness.tick().await;

    // The stored URL survives even though the backend now answers with B,
    // because a stored recording is never fetched again.
    let state = harness.snapshot().await;
    assert_eq!(state.recording_url("c1"), Some("https://r/A.mp3"));
    assert_eq!(harness.api.recording_fetch_count("c1").await, 1);
    // refetch_completed kept the call eligible, so the tick did visit it.
    assert_eq!(harness.api.transcript_fetch_count("c1").await, 2);
}

// ---- Test 2: Transient errors never regress transcripts ----

#[tokio::test]
async fn test_transcript_survives_transient_fetch_error() {
    let harness = TestHarness::builder().with_refetch_completed().build().unwrap();
    harness.api.queue_list(vec![record("c2", CallStatus::Success)]).await;
    harness
        .api
        .queue_transcript(
            "c2",
            TranscriptFetch::Aligned(vec![segment(Speaker::Agent, "seg1")]),
        )
        .await;
    harness.api.queue_transcript_error("c2", "backend down").await;

    harness.tick().await;
    harness.tick().await;

    let state = harness.snapshot().await;
    let entry = state.transcript("c2").unwrap();
    let aligned = entry.aligned.as_ref().unwrap();
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].text, "seg1");
    assert!(entry.error.is_some());
}

// ---- Test 3: One call's failure never blocks another ----

#[tokio::test]
async fn test_call_failures_are_isolated() {
    let harness = TestHarness::builder().build().unwrap();
    harness
        .api
        .queue_list(vec![
            record("c3", CallStatus::Success),
            record("c4", CallStatus::Success),
        ])
        .await;
    harness.api.queue_transcript_error("c3", "backend down").await;
    harness
        .api
        .queue_transcript(
            "c4",
            TranscriptFetch::Aligned(vec![segment(Speaker::Caller, "fine")]),
        )
        .await;

    harness.tick().await;

    let state = harness.snapshot().await;
    assert!(state.transcript_complete("c4"));
    assert!(state.transcript("c3").unwrap().error.is_some());
}

// ---- Test 4: Pending calls trigger no artifact fetches ----

#[tokio::test]
async fn test_pending_calls_fetch_nothing() {
    let harness = TestHarness::builder().build().unwrap();
    harness.api.queue_list(vec![record("c5", CallStatus::Pending)]).await;

    harness.tick().await;
    harness.tick().await;

    assert_eq!(harness.api.transcript_fetch_count("c5").await, 0);
    assert_eq!(harness.api.recording_fetch_count("c5").await, 0);
    assert_eq!(harness.snapshot().await.calls().len(), 1);
}

// ---- Test 5: Plain-text transcripts wrap as one agent segment ----

#[tokio::test]
async fn test_plain_text_transcript_wraps_as_agent_segment() {
    let harness = TestHarness::builder().build().unwrap();
    harness.api.queue_list(vec![record("c6", CallStatus::Success)]).await;
    harness
        .api
        .queue_transcript("c6", TranscriptFetch::Text("hello".to_string()))
        .await;

    harness.tick().await;

    let state = harness.snapshot().await;
    let aligned = state.transcript("c6").unwrap().aligned.clone().unwrap();
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].speaker, Speaker::Agent);
    assert_eq!(aligned[0].text, "hello");
}

// ---- Test 6: Place-then-poll scenario through the run loop ----

#[tokio::test(start_paused = true)]
async fn test_place_then_poll_until_artifacts_arrive() {
    let harness = TestHarness::builder().with_phone("5551234567").build().unwrap();

    // Script the backend: empty history, then the freshly placed call as
    // pending, then the same call finished.
    harness.api.queue_list(vec![]).await;
    harness.api.queue_list(vec![record("abc123", CallStatus::Pending)]).await;
    harness.api.queue_list(vec![record("abc123", CallStatus::Success)]).await;
    harness
        .api
        .queue_place_outcome(PlaceCallOutcome {
            call_id: Some("abc123".to_string()),
            status: Some(CallStatus::Pending),
            message: Some("Call has been placed successfully!".to_string()),
        })
        .await;
    harness
        .api
        .queue_transcript(
            "abc123",
            TranscriptFetch::Aligned(vec![
                segment(Speaker::Caller, "hi"),
                segment(Speaker::Agent, "hello"),
            ]),
        )
        .await;
    harness
        .api
        .queue_recording("abc123", RecordingFetch::Ready("https://r/abc123.mp3".to_string()))
        .await;

    let cancel = CancellationToken::new();
    let run = tokio::spawn({
        let reconciler = Arc::clone(&harness.reconciler);
        let cancel = cancel.clone();
        async move { reconciler.run(cancel).await }
    });

    // The first pass fires immediately and sees empty history.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.api.list_fetch_count().await, 1);
    assert!(harness.snapshot().await.calls().is_empty());

    // Placement succeeds and triggers an immediate out-of-band refresh.
    let outcome = harness
        .place_call("5551234567", "ask about billing")
        .await
        .unwrap();
    assert_eq!(outcome.call_id.as_deref(), Some("abc123"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let state = harness.snapshot().await;
    assert_eq!(harness.api.list_fetch_count().await, 2);
    assert_eq!(state.calls().len(), 1);
    assert_eq!(state.calls()[0].status, CallStatus::Pending);
    // Not terminal yet, so no artifact fetches have gone out.
    assert_eq!(harness.api.transcript_fetch_count("abc123").await, 0);
    assert_eq!(harness.api.recording_fetch_count("abc123").await, 0);

    // The next scheduled pass sees the finished call and collects both
    // artifacts (default interval is 3 seconds).
    tokio::time::sleep(Duration::from_secs(4)).await;
    let state = harness.snapshot().await;
    assert_eq!(state.calls()[0].status, CallStatus::Success);
    assert!(state.transcript_complete("abc123"));
    assert_eq!(
        state.transcript("abc123").unwrap().aligned.as_ref().unwrap().len(),
        2
    );
    assert_eq!(state.recording_url("abc123"), Some("https://r/abc123.mp3"));

    cancel.cancel();
    run.await.unwrap();
}

// ---- Test 7: Full stack against a wire-level backend ----

#[tokio::test]
async fn test_reconciler_consumes_wire_formats() {
    use serde_json::json;
    use voxio_client::CallsClient;
    use voxio_config::VoxioConfig;
    use voxio_reconciler::Reconciler;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history/5551234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "call_id": "abc123",
            "phone_number": "5551234567",
            "topic": "ask about billing",
            "status": "success",
            "call_time": "2026-03-14T09:26:53Z"
        }])))
        .mount(&server)
        .await;

    // The corrected transcript is preferred but missing, so the client
    // falls back to the raw endpoint.
    Mock::given(method("GET"))
        .and(path("/call_corrected_transcript/abc123"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "No corrected transcript"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/call_transcript/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "aligned": [
                {"speaker": "user", "text": "hi"},
                {"speaker": "agent", "text": "hello"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/call_recording/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "recording_url": "https://r/abc123.mp3"
        })))
        .mount(&server)
        .await;

    let mut config = VoxioConfig::default();
    config.api.base_url = server.uri();
    config.identity.phone_number = Some("5551234567".to_string());

    let client = CallsClient::new(&config.api).unwrap();
    let reconciler = Reconciler::new(Arc::new(client) as Arc<dyn CallsApi>, &config).unwrap();

    reconciler.tick().await;

    let state = reconciler.snapshot().await;
    assert_eq!(state.calls().len(), 1);
    assert_eq!(state.calls()[0].topic, "ask about billing");
    assert!(state.transcript_complete("abc123"));

    let aligned = state.transcript("abc123").unwrap().aligned.clone().unwrap();
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].speaker, Speaker::Caller);
    assert_eq!(aligned[1].speaker, Speaker::Agent);
    assert_eq!(state.recording_url("abc123"), Some("https://r/abc123.mp3"));
}
