//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/homunculus/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/homunculus/` (~/.config/homunculus/)
//! - Data: `$XDG_DATA_HOME/homunculus/` (~/.local/share/homunculus/)
//! - State/Logs: `$XDG_STATE_HOME/homunculus/` (~/.local/state/homunculus/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Observation capture settings
    #[serde(default)]
    pub observation: ObservationConfig,

    /// Pattern analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Strategic compaction advisor settings
    #[serde(default)]
    pub compact: CompactConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Observation capture configuration
#[derive(Debug, Deserialize)]
pub struct ObservationConfig {
    /// Override for the observation root directory
    pub home: Option<PathBuf>,

    /// Size ceiling of the active log before it is archived
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// How long to wait for the hook payload on stdin
    #[serde(default = "default_stdin_timeout_ms")]
    pub stdin_timeout_ms: u64,

    /// Environment variable the host uses to publish its session id
    #[serde(default = "default_session_env")]
    pub session_env: String,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            home: None,
            max_file_size_mb: default_max_file_size_mb(),
            stdin_timeout_ms: default_stdin_timeout_ms(),
            session_env: default_session_env(),
        }
    }
}

impl ObservationConfig {
    /// Size ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Stdin wait as a [`Duration`](std::time::Duration).
    pub fn stdin_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.stdin_timeout_ms)
    }

    /// Session id published by the host, if any.
    pub fn env_session(&self) -> Option<String> {
        std::env::var(&self.session_env)
            .ok()
            .filter(|value| !value.is_empty())
    }
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_stdin_timeout_ms() -> u64 {
    3000
}

fn default_session_env() -> String {
    "CURSOR_SESSION_ID".to_string()
}

/// Pattern analysis configuration
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum occurrences before a pattern becomes a suggestion
    #[serde(default = "default_min_count")]
    pub min_count: usize,

    /// Minimum number of records before analysis runs at all
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_count: default_min_count(),
            min_observations: default_min_observations(),
        }
    }
}

fn default_min_count() -> usize {
    3
}

fn default_min_observations() -> usize {
    10
}

/// Strategic compaction advisor configuration
#[derive(Debug, Deserialize)]
pub struct CompactConfig {
    /// Tool-call count at which the first suggestion is made
    #[serde(default = "default_compact_threshold")]
    pub threshold: u64,

    /// Reminder cadence once the threshold has been passed
    #[serde(default = "default_compact_interval")]
    pub interval: u64,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            threshold: default_compact_threshold(),
            interval: default_compact_interval(),
        }
    }
}

fn default_compact_threshold() -> u64 {
    50
}

fn default_compact_interval() -> u64 {
    25
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/homunculus/config.toml` (~/.config/homunculus/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("homunculus").join("config.toml")
    }

    /// Returns the data directory path (for the observation log)
    ///
    /// `$XDG_DATA_HOME/homunculus/` (~/.local/share/homunculus/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("homunculus")
    }

    /// Returns the state directory path (for logs and counters)
    ///
    /// `$XDG_STATE_HOME/homunculus/` (~/.local/state/homunculus/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("homunculus")
    }

    /// Returns the directory holding per-session counters
    pub fn counters_dir() -> PathBuf {
        Self::state_dir().join("counters")
    }
}

/// Well-known files under the observation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationPaths {
    /// Root directory
    pub root: PathBuf,
    /// Active event store
    pub observations: PathBuf,
    /// Directory receiving rotated stores
    pub archive_dir: PathBuf,
    /// Kill switch marker; its presence disables ingestion
    pub disabled_flag: PathBuf,
    /// Plain-text pid of the long-running observer
    pub observer_pid: PathBuf,
}

impl ObservationPaths {
    /// Lay out the well-known files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            observations: root.join("observations.jsonl"),
            archive_dir: root.join("observations.archive"),
            disabled_flag: root.join("disabled"),
            observer_pid: root.join(".observer.pid"),
            root,
        }
    }

    /// Resolve the root from config, falling back to the XDG data dir.
    pub fn from_config(config: &Config) -> Self {
        match &config.observation.home {
            Some(home) => Self::new(home.clone()),
            None => Self::new(Config::data_dir()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.observation.home.is_none());
        assert_eq!(config.observation.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.observation.stdin_timeout_ms, 3000);
        assert_eq!(config.analysis.min_count, 3);
        assert_eq!(config.analysis.min_observations, 10);
        assert_eq!(config.compact.threshold, 50);
        assert_eq!(config.compact.interval, 25);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[observation]
home = "/tmp/homunculus"
max_file_size_mb = 2
session_env = "CLAUDE_SESSION_ID"

[analysis]
min_count = 5

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(
            config.observation.home.as_deref(),
            Some(Path::new("/tmp/homunculus"))
        );
        assert_eq!(config.observation.max_file_size_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.observation.session_env, "CLAUDE_SESSION_ID");
        assert_eq!(config.analysis.min_count, 5);
        assert_eq!(config.analysis.min_observations, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis\nmin_count = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_observation_paths_layout() {
        let paths = ObservationPaths::new("/data/homunculus");
        assert!(paths.observations.ends_with("observations.jsonl"));
        assert!(paths.archive_dir.ends_with("observations.archive"));
        assert!(paths.disabled_flag.ends_with("disabled"));
        assert!(paths.observer_pid.ends_with(".observer.pid"));
    }

    #[test]
    fn test_paths_honor_home_override() {
        let config: Config = toml::from_str("[observation]\nhome = \"/srv/obs\"").unwrap();
        let paths = ObservationPaths::from_config(&config);
        assert_eq!(paths.root, PathBuf::from("/srv/obs"));
    }
}
