// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxio history` command implementation.
//!
//! Fetches the call list once for the configured identity and prints it as
//! a status-colored table, or as JSON for scripting.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use voxio_client::CallsClient;
use voxio_config::VoxioConfig;
use voxio_core::{CallRecord, CallStatus, CallsApi, VoxioError};

/// Run the `voxio history` command.
///
/// If `--json` is passed, outputs the raw call list as JSON.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_history(
    config: &VoxioConfig,
    json: bool,
    plain: bool,
) -> Result<(), VoxioError> {
    let identity = config.identity.to_identity();
    if identity.is_empty() {
        return Err(VoxioError::Config(
            "history requires identity.phone_number or identity.user_id".into(),
        ));
    }

    let client = CallsClient::new(&config.api)?;
    let calls = client.list_calls(&identity).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&calls).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    print_history(&calls, use_color);
    Ok(())
}

/// Print the call list as a small table.
fn print_history(calls: &[CallRecord], use_color: bool) {
    println!();
    println!("  voxio history");
    println!("  {}", "-".repeat(35));

    if calls.is_empty() {
        println!("    No calls yet.");
        println!();
        println!("  Place one with: voxio call <phone> <topic>");
        println!();
        return;
    }

    for call in calls {
        let when = format_call_time(call.call_time);
        let id = call.call_id.as_deref().unwrap_or("-");
        println!(
            "    {}  {}  {}  {}",
            status_label(&call.status, use_color),
            when,
            call.topic,
            id
        );
    }
    println!();
}

/// Format the call time, falling back to a dash for rows without one.
fn format_call_time(call_time: Option<DateTime<Utc>>) -> String {
    match call_time {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => "----------------".to_string(),
    }
}

/// Render a status with a fixed width so rows line up.
fn status_label(status: &CallStatus, use_color: bool) -> String {
    let text = format!("{:<12}", status.to_string());
    if !use_color {
        return text;
    }

    use colored::Colorize;
    if status.is_terminal_success() {
        text.green().to_string()
    } else if status.is_failed() {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}
