//! Append-only observation log
//!
//! The store is a newline-delimited JSON file, one [`EventRecord`] per line.
//! It is never edited in place: records are appended, and once the file
//! reaches its size ceiling the whole file is renamed into the archive
//! directory and the next append starts a fresh one.
//!
//! ## Concurrency
//!
//! Several hook processes may append at once. Each append is one `write` of
//! one complete line on a file opened with `O_APPEND`, which keeps lines from
//! interleaving. There is no cross-process lock; a rotation racing an append
//! can lose at most the record written in that instant.
//!
//! Operations return [`Result`]; deciding to swallow a failure is left to the
//! caller (see [`Ingestor`](crate::ingest::Ingestor)).

mod archive;

pub use archive::{archive_file_name, unique_archive_path};

use crate::config::ObservationPaths;
use crate::error::Result;
use crate::types::EventRecord;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Handle to the active observation log and its archive directory.
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
    archive_dir: PathBuf,
    max_bytes: u64,
}

impl EventStore {
    /// Open the store laid out by `paths` with a `max_bytes` ceiling.
    ///
    /// Nothing is touched on disk until the first append.
    pub fn new(paths: &ObservationPaths, max_bytes: u64) -> Self {
        Self::at(&paths.observations, &paths.archive_dir, max_bytes)
    }

    /// Open a store at explicit locations.
    pub fn at(path: &Path, archive_dir: &Path, max_bytes: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            archive_dir: archive_dir.to_path_buf(),
            max_bytes,
        }
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding rotated logs.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Append one record as one line.
    pub fn append(&self, record: &EventRecord) -> Result<()> {
        let line = record.to_line()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // Single write of the whole line; never split across calls.
        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Archive the active file if it is at or above the ceiling.
    ///
    /// Returns the archive path when a rotation happened. A missing active
    /// file is not an error.
    pub fn rotate_if_oversize(&self) -> Result<Option<PathBuf>> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if size < self.max_bytes {
            return Ok(None);
        }

        fs::create_dir_all(&self.archive_dir)?;
        let target = unique_archive_path(&self.archive_dir, Utc::now());
        fs::rename(&self.path, &target)?;

        tracing::info!(
            size,
            archive = %target.display(),
            "Rotated observation log"
        );

        Ok(Some(target))
    }

    /// Every parseable record of the active file, in append order.
    ///
    /// Any line that parses as JSON counts, even one this crate did not
    /// write (see [`EventRecord::from_stored`]). Lines that are not JSON are
    /// skipped. Archives are not read.
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let content = String::from_utf8_lossy(&bytes);
        let mut skipped = 0usize;
        let records: Vec<EventRecord> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(value) => EventRecord::from_stored(value),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, path = %self.path.display(), "Skipped unparseable lines");
        }

        Ok(records)
    }
}
