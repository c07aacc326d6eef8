// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a reconciler over a scripted [`MockCallsApi`]
//! with a ready-made configuration. Tests script the backend, drive passes
//! with `tick()`, and assert on `snapshot()`.

use std::sync::Arc;

use voxio_config::VoxioConfig;
use voxio_core::{CallsApi, PlaceCallOutcome, VoxioError};
use voxio_reconciler::{Reconciler, ReconcilerState};

use crate::mock_api::MockCallsApi;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    phone_number: Option<String>,
    user_id: Option<String>,
    premium: bool,
    max_calls: Option<usize>,
    refetch_completed: bool,
    keep_history_on_error: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            phone_number: None,
            user_id: None,
            premium: false,
            max_calls: None,
            refetch_completed: false,
            keep_history_on_error: true,
        }
    }

    /// Poll history for this phone number.
    pub fn with_phone(mut self, phone_number: &str) -> Self {
        self.phone_number = Some(phone_number.to_string());
        self
    }

    /// Poll history for this user id instead of a phone number.
    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Enable premium placement (no allowance check, no topic screen).
    pub fn with_premium(mut self) -> Self {
        self.premium = true;
        self
    }

    /// Override the placement allowance.
    pub fn with_max_calls(mut self, max_calls: usize) -> Self {
        self.max_calls = Some(max_calls);
        self
    }

    /// Refetch artifacts even for calls that already have them.
    pub fn with_refetch_completed(mut self) -> Self {
        self.refetch_completed = true;
        self
    }

    /// Empty the call list when a list fetch fails, instead of keeping the
    /// last good one.
    pub fn without_history_on_error(mut self) -> Self {
        self.keep_history_on_error = false;
        self
    }

    /// Build the test harness, wiring a reconciler to a fresh mock backend.
    pub fn build(self) -> Result<TestHarness, VoxioError> {
        let mut config = VoxioConfig::default();

        config.identity.user_id = self.user_id;
        config.identity.phone_number = match self.phone_number {
            Some(phone) => Some(phone),
            // A reconciler needs someone to poll for.
            None if config.identity.user_id.is_none() => Some("5551234567".to_string()),
            None => None,
        };

        config.call.premium = self.premium;
        if let Some(max_calls) = self.max_calls {
            config.call.max_calls = max_calls;
        }
        config.poller.refetch_completed = self.refetch_completed;
        config.poller.keep_history_on_error = self.keep_history_on_error;

        let api = Arc::new(MockCallsApi::new());
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&api) as Arc<dyn CallsApi>,
            &config,
        )?);

        Ok(TestHarness {
            api,
            reconciler,
            config,
        })
    }
}

/// A complete test environment: a reconciler wired to a scripted backend.
pub struct TestHarness {
    /// The scripted mock backend.
    pub api: Arc<MockCallsApi>,
    /// The reconciler under test.
    pub reconciler: Arc<Reconciler>,
    /// The configuration the reconciler was built from.
    pub config: VoxioConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one reconciliation pass.
    pub async fn tick(&self) {
        self.reconciler.tick().await;
    }

    /// Clone of the reconciler's current view state.
    pub async fn snapshot(&self) -> ReconcilerState {
        self.reconciler.snapshot().await
    }

    /// Run the placement flow against the mock backend.
    pub async fn place_call(
        &self,
        phone_number: &str,
        topic: &str,
    ) -> Result<PlaceCallOutcome, VoxioError> {
        self.reconciler.place_call(phone_number, topic).await
    }
}
