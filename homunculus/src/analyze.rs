//! homunculus-analyze - mine the observation log for recurring patterns
//!
//! Meant to run once at session end. Suggestions are printed to stderr as a
//! short report; stdout stays silent unless `--format json` is requested.
//! Always exits 0.

mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use homunculus_core::report;
use homunculus_core::{Config, EventStore, ObservationPaths, PatternAnalyzer, PatternModels};
use std::io::Write;

#[derive(Parser, Debug, Default)]
#[command(name = "homunculus-analyze")]
#[command(about = "Suggest automations from recurring tool-usage patterns")]
#[command(version)]
struct Args {
    /// Minimum occurrences for a pattern (overrides config)
    #[arg(short = 'n', long)]
    min_count: Option<usize>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() {
    let args: Args = bootstrap::parse_args();
    let runtime = bootstrap::start("homunculus-analyze");

    if let Err(e) = run(&args, &runtime.config) {
        tracing::warn!(error = %e, "Pattern analysis failed");
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let paths = ObservationPaths::from_config(config);
    let store = EventStore::new(&paths, config.observation.max_file_size_bytes());
    let records = store
        .read_all()
        .context("failed to read observation log")?;

    let mut analyzer = PatternAnalyzer::from_config(&config.analysis);
    if let Some(min_count) = args.min_count {
        analyzer = PatternAnalyzer::new(min_count)
            .with_min_observations(config.analysis.min_observations);
    }

    let suggestions = analyzer.analyze(&records);
    tracing::info!(
        records = records.len(),
        suggestions = suggestions.len(),
        min_count = analyzer.min_count(),
        "Pattern analysis complete"
    );

    report::report(&mut std::io::stderr(), &suggestions, records.len())
        .context("failed to write report")?;

    if args.format == "json" {
        let models = if analyzer.has_enough_data(&records) {
            PatternModels::build(&records)
        } else {
            PatternModels::default()
        };
        let output = serde_json::json!({
            "total_events": records.len(),
            "suggestions": suggestions,
            "models": models.to_json(),
        });
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)
            .and_then(|()| stdout.flush())
            .context("failed to write JSON output")?;
    }

    Ok(())
}
