// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Voxio integration tests.
//!
//! Provides a scripted mock backend and a harness for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockCallsApi`] - Mock calls backend with scripted per-call responses
//! - [`TestHarness`] - Assembled reconciler stack over the mock backend

pub mod harness;
pub mod mock_api;

pub use harness::TestHarness;
pub use mock_api::MockCallsApi;
