// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxio watch` command implementation.
//!
//! Starts the polling loop against the configured backend and keeps the
//! local view of calls, transcripts, and recordings fresh until the process
//! is signalled. All observable output is structured logging; the view
//! itself lives in memory for the lifetime of the process.

use std::sync::Arc;

use tracing::{error, info};
use voxio_client::CallsClient;
use voxio_config::VoxioConfig;
use voxio_core::{CallsApi, VoxioError};
use voxio_reconciler::{Reconciler, shutdown};

/// Runs the `voxio watch` command.
///
/// Builds the HTTP client and reconciler from configuration, installs
/// signal handlers, and runs the polling loop until cancelled.
pub async fn run_watch(config: VoxioConfig) -> Result<(), VoxioError> {
    // Initialize tracing subscriber.
    init_tracing(&config.daemon.log_level);

    info!("starting voxio watch");

    let client = CallsClient::new(&config.api).map_err(|e| {
        error!(error = %e, "failed to initialize calls client");
        e
    })?;

    let reconciler = Reconciler::new(Arc::new(client) as Arc<dyn CallsApi>, &config)
        .map_err(|e| {
            error!(error = %e, "failed to initialize reconciler");
            eprintln!(
                "error: an identity is required for polling. Set identity.phone_number or \
                 identity.user_id in voxio.toml, or VOXIO_IDENTITY_PHONE_NUMBER."
            );
            e
        })?;

    info!(
        base_url = config.api.base_url.as_str(),
        interval_ms = config.poller.interval_ms,
        "poller configured"
    );

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    reconciler.run(cancel).await;

    info!("voxio watch shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Default filter directive when `RUST_LOG` is unset.
///
/// Filter prefixes bind at `::` boundaries, so `voxio=` alone would match
/// only the binary; the library crates that carry the runtime logging need
/// their own directives. Everything else stays at warn.
fn default_filter(log_level: &str) -> String {
    format!("voxio={log_level},voxio_client={log_level},voxio_reconciler={log_level},warn")
}
