//! d2 CLI
//!
//! Runs local DHIS2 clusters on docker-compose and publishes apps to the
//! App Hub.

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod tracing;

use crate::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    if let Err(error) = run().await {
        ::tracing::error!(correlation_id = %crate::tracing::correlation_id(), "Command failed");
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

async fn run() -> miette::Result<()> {
    let cli = cli::parse();

    init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        ..TracingConfig::default()
    })?;

    commands::execute(cli.command).await
}
