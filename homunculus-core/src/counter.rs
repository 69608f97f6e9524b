//! Per-session counters and the strategic compaction advisor.
//!
//! Hooks are short-lived processes, so anything that must survive between
//! invocations lives on disk. [`CounterStore`] is a tiny key-value store: one
//! file per key, holding a decimal count. It is not locked; two hooks racing
//! on the same session can lose an increment.

use crate::config::CompactConfig;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-backed counters keyed by session id.
#[derive(Debug, Clone)]
pub struct CounterStore {
    dir: PathBuf,
}

impl CounterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current value; missing or unreadable counters are zero.
    pub fn get(&self, key: &str) -> Result<u64> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(content.trim().parse().unwrap_or(0)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Add one and return the new value.
    pub fn increment(&self, key: &str) -> Result<u64> {
        let next = self.get(key)?.saturating_add(1);
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), next.to_string())?;
        Ok(next)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("tool-count-{}", sanitize_key(key)))
    }
}

/// Restrict a key to filename-safe characters.
fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

/// Suggests manual compaction at logical checkpoints of a long session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactAdvisor {
    pub threshold: u64,
    pub interval: u64,
}

impl CompactAdvisor {
    pub fn new(threshold: u64, interval: u64) -> Self {
        Self {
            threshold,
            interval,
        }
    }

    pub fn from_config(config: &CompactConfig) -> Self {
        Self::new(config.threshold, config.interval)
    }

    /// Advice for the `count`-th tool call, if this call is a checkpoint.
    pub fn advise(&self, count: u64) -> Option<String> {
        if count == self.threshold {
            return Some(format!(
                "[StrategicCompact] {} tool calls reached - consider /compact if transitioning phases",
                self.threshold
            ));
        }
        if count > self.threshold && self.interval > 0 && count % self.interval == 0 {
            return Some(format!(
                "[StrategicCompact] {count} tool calls - good checkpoint for /compact if context is stale"
            ));
        }
        None
    }
}
