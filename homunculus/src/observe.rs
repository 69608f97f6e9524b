//! homunculus-observe - capture one tool-usage event from the host
//!
//! The host pipes a JSON hook payload on stdin. The payload is normalized
//! and appended to `$XDG_DATA_HOME/homunculus/observations.jsonl`.
//!
//! This hook writes nothing to stdout or stderr and always exits 0.

mod bootstrap;

use clap::Parser;
use homunculus_core::{IngestOutcome, Ingestor, NotifyOutcome};
use std::time::Duration;

#[derive(Parser, Debug, Default)]
#[command(name = "homunculus-observe")]
#[command(about = "Record one hook payload from stdin into the observation log")]
#[command(version)]
struct Args {
    /// How long to wait for the payload, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() {
    let args: Args = bootstrap::parse_args();
    let runtime = bootstrap::start("homunculus-observe");

    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| runtime.config.observation.stdin_timeout());

    let ingestor = Ingestor::from_config(&runtime.config);
    match ingestor.ingest_reader(std::io::stdin(), timeout) {
        IngestOutcome::Disabled => tracing::debug!("Observation disabled"),
        IngestOutcome::Empty => tracing::debug!("Empty payload"),
        IngestOutcome::Recorded {
            record,
            rotated_to,
            notify,
        } => {
            if let Some(archive) = rotated_to {
                tracing::info!(archive = %archive.display(), "Archived observation log");
            }
            if let NotifyOutcome::Failed { reason } = notify {
                tracing::debug!(%reason, "Observer not notified");
            }
            tracing::debug!(event = %record.event, "Observation recorded");
        }
        IngestOutcome::Malformed { record, .. } => {
            tracing::warn!(error = record.error.as_deref().unwrap_or(""), "Recorded unparseable payload");
        }
        IngestOutcome::Dropped { reason } => {
            tracing::warn!(%reason, "Observation dropped");
        }
    }
}
