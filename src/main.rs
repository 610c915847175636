//! potrack - PO task tracking CLI
//!
//! A standalone CLI for tracking operational PO tasks against their SLAs:
//! role-gated edits, urgency badges, and automatic almost-expired promotion.

use clap::Parser;
use potrack::cli::Cli;
use potrack::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Tracing is opt-in via RUST_LOG. Invalid or oversized filter strings are
// ignored rather than aborting startup.
fn log_filter() -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"))
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter())
        .init();

    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
