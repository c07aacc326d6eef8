// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Voxio call poller.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use voxio_core::Identity;

/// Top-level Voxio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VoxioConfig {
    /// Polling loop settings.
    #[serde(default)]
    pub poller: PollerConfig,

    /// Calls-backend HTTP settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Which account history fetches are scoped to.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Call placement settings.
    #[serde(default)]
    pub call: CallConfig,

    /// Daemon process settings.
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Polling loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollerConfig {
    /// Tick period in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum number of per-call fetches running at once within one tick.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Keep the last good call list when the list fetch fails. When false,
    /// a failed list fetch empties the local list instead.
    #[serde(default = "default_keep_history_on_error")]
    pub keep_history_on_error: bool,

    /// Re-fetch transcripts for calls that already have a complete one.
    #[serde(default = "default_refetch_completed")]
    pub refetch_completed: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            keep_history_on_error: default_keep_history_on_error(),
            refetch_completed: default_refetch_completed(),
        }
    }
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_keep_history_on_error() -> bool {
    true
}

fn default_refetch_completed() -> bool {
    false
}

/// Calls-backend HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Root URL of the calls backend, including the path prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry count for GET requests that hit a transient HTTP status.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Try the corrected-transcript endpoint first, falling back to the
    /// raw one when the corrected fetch fails.
    #[serde(default = "default_prefer_corrected")]
    pub prefer_corrected: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            prefer_corrected: default_prefer_corrected(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

fn default_prefer_corrected() -> bool {
    true
}

/// Account identity configuration.
///
/// A signed-in user sets `user_id` (which takes precedence for history
/// fetches); a guest sets `phone_number` alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Guest identity: destination phone number, digits only.
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Signed-in identity: opaque user identifier.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl IdentityConfig {
    pub fn to_identity(&self) -> Identity {
        Identity {
            phone_number: self.phone_number.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

/// Call placement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallConfig {
    /// Premium account: skips the moderation screen and the call allowance,
    /// and uses the longer duration cap.
    #[serde(default = "default_premium")]
    pub premium: bool,

    /// Duration cap in seconds sent with non-premium placements.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u32,

    /// Duration cap in seconds sent with premium placements.
    #[serde(default = "default_premium_max_duration_secs")]
    pub premium_max_duration_secs: u32,

    /// Placement allowance for non-premium accounts.
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            premium: default_premium(),
            max_duration_secs: default_max_duration_secs(),
            premium_max_duration_secs: default_premium_max_duration_secs(),
            max_calls: default_max_calls(),
        }
    }
}

fn default_premium() -> bool {
    false
}

fn default_max_duration_secs() -> u32 {
    60
}

fn default_premium_max_duration_secs() -> u32 {
    180
}

fn default_max_calls() -> usize {
    3
}

/// Daemon process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
