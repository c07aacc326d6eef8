// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxio call` command implementation.
//!
//! Places a single call through the full placement flow (allowance check,
//! moderation screen, backend request) and prints the outcome. The call
//! list is refreshed once before placing so the allowance reflects current
//! history.

use std::io::IsTerminal;
use std::sync::Arc;

use voxio_client::CallsClient;
use voxio_config::VoxioConfig;
use voxio_core::{CallsApi, PlaceCallOutcome, VoxioError};
use voxio_reconciler::Reconciler;

/// Run the `voxio call` command.
///
/// Rejections and errors propagate to the caller; in-band refusals from the
/// backend print their message and exit cleanly, matching what the backend
/// reported.
pub async fn run_call(
    config: &VoxioConfig,
    phone_number: &str,
    topic: &str,
    plain: bool,
) -> Result<(), VoxioError> {
    let mut config = config.clone();
    config.identity.phone_number = Some(phone_number.to_string());

    let client = CallsClient::new(&config.api)?;
    let reconciler = Reconciler::new(Arc::new(client) as Arc<dyn CallsApi>, &config)?;

    let use_color = !plain && std::io::stdout().is_terminal();

    println!();
    println!("  Placing call to {phone_number}...");

    // Count the allowance against the current identity's history.
    reconciler.refresh_list().await;

    let outcome = reconciler.place_call(phone_number, topic).await?;
    if outcome.placed() {
        print_placed(&outcome, topic, use_color);
    } else {
        print_refused(&outcome, use_color);
    }

    Ok(())
}

/// Print a successful placement, with the topic suggestion when one applies.
fn print_placed(outcome: &PlaceCallOutcome, topic: &str, use_color: bool) {
    if use_color {
        use colored::Colorize;
        println!("  {} {}", "✓".green(), "Call placed successfully!".green());
    } else {
        println!("  [OK] Call placed successfully!");
    }

    if let Some(call_id) = &outcome.call_id {
        println!("    Call id: {call_id}");
    }

    if let Some(suggestion) = voxio_moderation::analyze_topic(topic) {
        if use_color {
            use colored::Colorize;
            println!("    {}", suggestion.yellow());
        } else {
            println!("    {suggestion}");
        }
    }

    println!();
    println!("  Watch for the transcript with: voxio watch");
    println!();
}

/// Print an in-band refusal from the backend.
fn print_refused(outcome: &PlaceCallOutcome, use_color: bool) {
    let message = outcome.message.as_deref().unwrap_or("Call failed.");

    if use_color {
        use colored::Colorize;
        println!("  {} {}", "✗".red(), message.red());
    } else {
        println!("  [FAIL] {message}");
    }
    println!();
}
