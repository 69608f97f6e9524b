//! Archive naming for rotated event stores.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Filesystem-safe archive name: the ISO timestamp to whole seconds with
/// `:` and `.` replaced by `-`.
pub fn archive_file_name(at: DateTime<Utc>) -> String {
    format!("observations-{}.jsonl", at.format("%Y-%m-%dT%H-%M-%S"))
}

/// First free archive path in `dir` for a rotation happening at `at`.
///
/// Two rotations inside the same second get `-1`, `-2`, ... suffixes instead
/// of overwriting each other.
pub fn unique_archive_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    let candidate = dir.join(archive_file_name(at));
    if !candidate.exists() {
        return candidate;
    }

    let stamp = at.format("%Y-%m-%dT%H-%M-%S");
    (1u32..)
        .map(|n| dir.join(format!("observations-{stamp}-{n}.jsonl")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
