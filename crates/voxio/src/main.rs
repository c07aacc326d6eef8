// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voxio - a call-status poller for the Voxio calls backend.
//!
//! This is the binary entry point for the Voxio poller.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod call;
mod history;
mod watch;

use clap::{Parser, Subcommand};

/// Voxio - a call-status poller for the Voxio calls backend.
#[derive(Parser, Debug)]
#[command(name = "voxio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the poller in the foreground until SIGINT/SIGTERM.
    Watch,
    /// Place a call, then watch it appear in history.
    Call {
        /// Phone number to dial.
        phone_number: String,
        /// What the call should be about.
        topic: String,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Fetch and print the call list once.
    History {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match voxio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            voxio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Watch) => watch::run_watch(config).await,
        Some(Commands::Call {
            phone_number,
            topic,
            plain,
        }) => call::run_call(&config, &phone_number, &topic, plain).await,
        Some(Commands::History { json, plain }) => {
            history::run_history(&config, json, plain).await
        }
        None => {
            println!("voxio: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
