// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./voxio.toml` > `~/.config/voxio/voxio.toml` > `/etc/voxio/voxio.toml`
//! with environment variable overrides via `VOXIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VoxioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/voxio/voxio.toml` (system-wide)
/// 3. `~/.config/voxio/voxio.toml` (user XDG config)
/// 4. `./voxio.toml` (local directory)
/// 5. `VOXIO_*` environment variables
pub fn load_config() -> Result<VoxioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxioConfig::default()))
        .merge(Toml::file("/etc/voxio/voxio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("voxio/voxio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("voxio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VoxioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VoxioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. `VOXIO_POLLER_INTERVAL_MS` must map to
/// `poller.interval_ms`, not `poller.interval.ms`.
fn env_provider() -> Env {
    Env::prefixed("VOXIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: VOXIO_IDENTITY_PHONE_NUMBER -> "identity_phone_number"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("poller_", "poller.", 1)
            .replacen("api_", "api.", 1)
            .replacen("identity_", "identity.", 1)
            .replacen("call_", "call.", 1)
            .replacen("daemon_", "daemon.", 1);
        mapped.into()
    })
}
