// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, digits-only phone numbers, and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::VoxioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VoxioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate base_url is not empty and carries an http(s) scheme
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.request_timeout_secs must be positive".to_string(),
        });
    }

    // A zero interval would busy-loop against the backend
    if config.poller.interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "poller.interval_ms must be positive".to_string(),
        });
    }

    if config.poller.max_concurrent_fetches == 0 {
        errors.push(ConfigError::Validation {
            message: "poller.max_concurrent_fetches must be at least 1".to_string(),
        });
    }

    // Phone numbers travel in URL paths; the backend expects digits only
    if let Some(phone) = &config.identity.phone_number {
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ConfigError::Validation {
                message: format!("identity.phone_number `{phone}` must contain digits only"),
            });
        }
    }

    if config.call.max_duration_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "call.max_duration_secs must be positive".to_string(),
        });
    }

    if config.call.premium_max_duration_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "call.premium_max_duration_secs must be positive".to_string(),
        });
    }

    if config.call.max_calls == 0 {
        errors.push(ConfigError::Validation {
            message: "call.max_calls must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
