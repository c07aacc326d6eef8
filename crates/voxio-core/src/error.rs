// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Voxio call poller.

use thiserror::Error;

/// The primary error type used across the Voxio workspace.
#[derive(Debug, Error)]
pub enum VoxioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Calls-backend errors (transport failure, non-success HTTP status, bad payload).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Call topic refused by the pre-flight moderation screen.
    #[error("topic rejected: {reason}")]
    Rejected { reason: String },

    /// Placement refused because the account's call allowance is spent.
    #[error("call limit reached: {used} of {max} calls used")]
    CallLimit { used: usize, max: usize },
}
