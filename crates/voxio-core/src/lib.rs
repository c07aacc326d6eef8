// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Voxio call poller.
//!
//! This crate provides the shared data model (call records, transcript and
//! recording state), the error type, and the [`CallsApi`] trait the
//! reconciler polls through. The HTTP client and the reconciler live in
//! their own crates and meet here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VoxioError;
pub use traits::CallsApi;
pub use types::{
    CallOptions, CallRecord, CallStatus, Identity, PlaceCallOutcome, RecordingFetch, Segment,
    Speaker, TranscriptEntry, TranscriptFetch,
};
