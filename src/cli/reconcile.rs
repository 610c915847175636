//! potrack reconcile command implementation.
//!
//! One-shot by default; `--watch` keeps a fixed-interval ticker running.

use std::path::PathBuf;
use std::time::Duration;

use crate::clock::SystemClock;
use crate::error::Result;
use crate::lifecycle::Ticker;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct Options {
    pub dir: Option<PathBuf>,
    // Accepted for CLI symmetry; reconciliation is not role-gated.
    pub actor: Option<String>,
    pub watch: bool,
    pub interval: Option<u64>,
    pub output: OutputOptions,
}

pub fn run(options: Options) -> Result<()> {
    let _ = options.actor;
    let service = super::load_service(options.dir.as_ref())?;

    let interval_secs = options
        .interval
        .unwrap_or(service.config().reconcile.interval_secs);
    let clock = SystemClock;
    let ticker = Ticker::new(&service, &clock, Duration::from_secs(interval_secs));

    if options.watch {
        tracing::info!(interval_secs, "starting reconciliation watch loop");
        return ticker.run(None);
    }

    let report = ticker.tick()?;

    let mut human = HumanOutput::new(format!(
        "potrack reconcile: {} promoted, {} failed",
        report.written, report.failed
    ));
    human.push_summary("planned", report.planned.to_string());
    human.push_summary("written", report.written.to_string());
    human.push_summary("failed", report.failed.to_string());
    if report.failed > 0 {
        human.push_warning("some write-backs failed; see logs and rerun".to_string());
    }

    emit_success(options.output, "reconcile", &report, Some(&human))?;

    Ok(())
}
