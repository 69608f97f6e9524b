//! Shared startup for the hook binaries.
//!
//! Hooks must never fail the host: a broken config falls back to defaults,
//! bad arguments fall back to default arguments, and a logging setup failure
//! just means running without logs.

use clap::error::ErrorKind;
use clap::Parser;
use homunculus_core::logging::{self, LoggingGuard};
use homunculus_core::Config;

pub struct HookRuntime {
    pub config: Config,
    _log_guard: Option<LoggingGuard>,
}

/// Parse the command line. `--help` and `--version` print and exit 0; any
/// other parse error is ignored in favour of the defaults.
pub fn parse_args<A: Parser + Default>() -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => A::default(),
    }
}

pub fn start(name: &str) -> HookRuntime {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_guard = logging::init(&config.logging).ok();

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Falling back to default configuration");
    }
    tracing::debug!(hook = name, "Hook starting");

    HookRuntime {
        config,
        _log_guard: log_guard,
    }
}
