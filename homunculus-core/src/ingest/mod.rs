//! Hook payload ingestion
//!
//! The host runs the observe hook once per lifecycle event and pipes one JSON
//! payload to it. The [`Ingestor`] turns that payload into one appended
//! [`EventRecord`]:
//!
//! ```text
//! disabled? ──yes──► Disabled
//!    │no
//! read stdin (bounded) ──empty──► Empty
//!    │
//! parse JSON ──error──► parse_error record ──► rotate? ──► append ──► Malformed
//!    │ok
//! classify ──► rotate? ──► append ──► notify observer ──► Recorded
//! ```
//!
//! Observation is a side channel of the host workflow, so nothing here
//! returns an error: every failure ends in an [`IngestOutcome`].

mod payload;
mod stdin;

pub use payload::{
    malformed_record, resolve_session, truncate_chars, HookPayload, MAX_FIELD_CHARS,
    MAX_RAW_CHARS,
};
pub use stdin::read_with_timeout;

use crate::config::{Config, ObservationPaths};
use crate::notify::{Notifier, NotifyOutcome};
use crate::store::EventStore;
use crate::types::EventRecord;
use chrono::Utc;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// How a single ingestion ended.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Kill switch present; nothing read, nothing written
    Disabled,
    /// Payload was empty or whitespace
    Empty,
    /// Payload normalized and appended
    Recorded {
        record: EventRecord,
        rotated_to: Option<PathBuf>,
        notify: NotifyOutcome,
    },
    /// Payload was not JSON; a `parse_error` record was appended
    Malformed {
        record: EventRecord,
        rotated_to: Option<PathBuf>,
    },
    /// The record could not be written
    Dropped { reason: String },
}

impl IngestOutcome {
    /// The record that reached the store, if any.
    pub fn record(&self) -> Option<&EventRecord> {
        match self {
            IngestOutcome::Recorded { record, .. } | IngestOutcome::Malformed { record, .. } => {
                Some(record)
            }
            _ => None,
        }
    }
}

/// Normalizes hook payloads into the event store.
#[derive(Debug, Clone)]
pub struct Ingestor {
    store: EventStore,
    notifier: Notifier,
    disabled_flag: PathBuf,
    env_session: Option<String>,
}

impl Ingestor {
    pub fn new(paths: &ObservationPaths, max_bytes: u64) -> Self {
        Self {
            store: EventStore::new(paths, max_bytes),
            notifier: Notifier::new(&paths.observer_pid),
            disabled_flag: paths.disabled_flag.clone(),
            env_session: None,
        }
    }

    /// Build from configuration, picking up the host session id from the
    /// configured environment variable.
    pub fn from_config(config: &Config) -> Self {
        let paths = ObservationPaths::from_config(config);
        Self::new(&paths, config.observation.max_file_size_bytes())
            .with_env_session(config.observation.env_session())
    }

    /// Session id supplied by the host environment.
    pub fn with_env_session(mut self, session: Option<String>) -> Self {
        self.env_session = session;
        self
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Whether the kill switch is present.
    pub fn is_disabled(&self) -> bool {
        self.disabled_flag.exists()
    }

    /// Read one payload from `reader` (waiting at most `timeout`) and ingest it.
    pub fn ingest_reader<R>(&self, reader: R, timeout: Duration) -> IngestOutcome
    where
        R: Read + Send + 'static,
    {
        if self.is_disabled() {
            return IngestOutcome::Disabled;
        }
        let payload = read_with_timeout(reader, timeout);
        self.process(&payload)
    }

    /// Ingest an already-read payload.
    pub fn ingest_payload(&self, payload: &str) -> IngestOutcome {
        if self.is_disabled() {
            return IngestOutcome::Disabled;
        }
        self.process(payload)
    }

    fn process(&self, payload: &str) -> IngestOutcome {
        if payload.trim().is_empty() {
            return IngestOutcome::Empty;
        }

        let env_session = self.env_session.as_deref();
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(data) => {
                let session = resolve_session(env_session, Some(&data));
                let record = HookPayload::classify(&data).into_record(session);
                let rotated_to = self.rotate();
                match self.append(record) {
                    Ok(record) => {
                        let notify = self.notifier.notify();
                        IngestOutcome::Recorded {
                            record,
                            rotated_to,
                            notify,
                        }
                    }
                    Err(reason) => IngestOutcome::Dropped { reason },
                }
            }
            Err(e) => {
                let session = resolve_session(env_session, None);
                let record = malformed_record(payload, &e, session);
                let rotated_to = self.rotate();
                match self.append(record) {
                    Ok(record) => IngestOutcome::Malformed { record, rotated_to },
                    Err(reason) => IngestOutcome::Dropped { reason },
                }
            }
        }
    }

    /// Rotation check against the size as of the previous append.
    fn rotate(&self) -> Option<PathBuf> {
        match self.store.rotate_if_oversize() {
            Ok(rotated) => rotated,
            Err(e) => {
                tracing::warn!(error = %e, "Observation log rotation failed");
                None
            }
        }
    }

    fn append(&self, mut record: EventRecord) -> std::result::Result<EventRecord, String> {
        record.timestamp = Some(Utc::now());
        match self.store.append(&record) {
            Ok(()) => {
                tracing::debug!(event = %record.event, tool = record.tool_or_unknown(), "Recorded observation");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.store.path().display(), "Failed to append observation");
                Err(e.to_string())
            }
        }
    }
}
