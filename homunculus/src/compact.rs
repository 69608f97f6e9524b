//! homunculus-compact - suggest manual compaction at logical checkpoints
//!
//! Run before each tool call. Counts tool calls per session and, at the
//! configured threshold and every `interval` calls after it, prints a hint
//! to stderr. Always exits 0.

mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use homunculus_core::{CompactAdvisor, Config, CounterStore};
use std::io::Write;

#[derive(Parser, Debug, Default)]
#[command(name = "homunculus-compact")]
#[command(about = "Count tool calls and suggest /compact at checkpoints")]
#[command(version)]
struct Args {
    /// Session key (defaults to the host session id, then the parent pid)
    #[arg(long)]
    session: Option<String>,
}

fn main() {
    let args: Args = bootstrap::parse_args();
    let runtime = bootstrap::start("homunculus-compact");

    if let Err(e) = run(&args, &runtime.config) {
        tracing::warn!(error = %e, "Compact advisor failed");
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let session = args
        .session
        .clone()
        .or_else(|| config.observation.env_session())
        .or_else(parent_pid)
        .unwrap_or_else(|| "default".to_string());

    let mut advisor = CompactAdvisor::from_config(&config.compact);
    if let Some(threshold) = std::env::var("COMPACT_THRESHOLD")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
    {
        advisor.threshold = threshold;
    }

    let counters = CounterStore::new(Config::counters_dir());
    let count = counters
        .increment(&session)
        .with_context(|| format!("failed to update tool-call counter for {session}"))?;

    tracing::debug!(%session, count, "Tool call counted");

    if let Some(advice) = advisor.advise(count) {
        writeln!(std::io::stderr(), "{advice}").context("failed to write compaction advice")?;
    }

    Ok(())
}

#[cfg(unix)]
fn parent_pid() -> Option<String> {
    Some(std::os::unix::process::parent_id().to_string())
}

#[cfg(not(unix))]
fn parent_pid() -> Option<String> {
    None
}
