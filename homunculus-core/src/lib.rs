//! # homunculus-core
//!
//! Core library for homunculus - continuous learning from IDE/agent tool usage.
//!
//! This library provides:
//! - The append-only observation log ([`EventStore`]) with size-based rotation
//! - Hook payload ingestion ([`Ingestor`]) and observer signalling ([`Notifier`])
//! - Pattern mining over the log ([`PatternAnalyzer`]) and its text report
//! - Configuration, logging, and a small per-session counter store
//!
//! ## Data flow
//!
//! ```text
//! host hook ──stdin──► Ingestor ──append──► observations.jsonl ──► PatternAnalyzer ──► report (stderr)
//!                         │                        │
//!                         ▼                        ▼
//!                   Notifier (SIGUSR1)   observations.archive/
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use homunculus_core::{Config, EventStore, ObservationPaths, PatternAnalyzer};
//!
//! let config = Config::load().unwrap_or_default();
//! let paths = ObservationPaths::from_config(&config);
//! let store = EventStore::new(&paths, config.observation.max_file_size_bytes());
//!
//! let records = store.read_all().expect("failed to read observations");
//! let suggestions = PatternAnalyzer::from_config(&config.analysis).analyze(&records);
//! println!("{} suggestion(s)", suggestions.len());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{PatternAnalyzer, PatternModels};
pub use config::{Config, ObservationPaths};
pub use counter::{CompactAdvisor, CounterStore};
pub use error::{Error, Result};
pub use ingest::{IngestOutcome, Ingestor};
pub use notify::{NotifyOutcome, Notifier};
pub use store::EventStore;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod counter;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod report;
pub mod store;
pub mod types;
