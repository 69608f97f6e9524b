//! Observer signalling
//!
//! A long-running observer may record its pid in `.observer.pid`. After each
//! append the ingestor fires `SIGUSR1` at that pid so the observer knows new
//! data is available. Delivery is fire-and-forget: there is no retry and no
//! acknowledgement, and most sessions have no observer at all.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened when we tried to wake the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No pid marker, nothing to do
    NoObserver,
    /// Signal handed to the kernel
    Signalled { pid: i32 },
    /// Stale pid, permission denied, malformed marker, ...
    Failed { reason: String },
}

/// Sends the "new data available" signal to the recorded observer.
#[derive(Debug, Clone)]
pub struct Notifier {
    pid_file: PathBuf,
}

impl Notifier {
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
        }
    }

    /// Path of the pid marker.
    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// Best-effort notification. Never fails.
    pub fn notify(&self) -> NotifyOutcome {
        let pid = match self.read_pid() {
            Ok(Some(pid)) => pid,
            Ok(None) => return NotifyOutcome::NoObserver,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring observer pid marker");
                return NotifyOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match send_user_signal(pid) {
            Ok(()) => {
                tracing::debug!(pid, "Signalled observer");
                NotifyOutcome::Signalled { pid }
            }
            Err(e) => {
                tracing::debug!(pid, error = %e, "Observer signal failed");
                NotifyOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn read_pid(&self) -> Result<Option<i32>> {
        let content = match fs::read_to_string(&self.pid_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        parse_pid(&content).map(Some)
    }
}

/// Parse a pid marker. Only positive pids are accepted; zero or negative
/// values would address process groups.
pub fn parse_pid(content: &str) -> Result<i32> {
    let trimmed = content.trim();
    match trimmed.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(Error::InvalidPid(trimmed.to_string())),
    }
}

#[cfg(unix)]
fn send_user_signal(pid: i32) -> io::Result<()> {
    // SAFETY: kill has no memory-safety preconditions; pid is positive.
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGUSR1) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_user_signal(_pid: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "observer signalling requires Unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marker_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Notifier::new(dir.path().join(".observer.pid"));
        assert_eq!(notifier.notify(), NotifyOutcome::NoObserver);
    }

    #[test]
    fn test_malformed_marker_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join(".observer.pid");
        fs::write(&pid_file, "not-a-pid\n").unwrap();

        let outcome = Notifier::new(&pid_file).notify();
        assert!(matches!(outcome, NotifyOutcome::Failed { .. }));
    }

    #[test]
    fn test_parse_pid_rejects_group_addresses() {
        assert_eq!(parse_pid(" 4242\n").unwrap(), 4242);
        assert!(parse_pid("0").is_err());
        assert!(parse_pid("-1").is_err());
        assert!(parse_pid("").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_pid_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join(".observer.pid");
        // Above the default pid_max on Linux and macOS.
        fs::write(&pid_file, "2147483646").unwrap();

        let outcome = Notifier::new(&pid_file).notify();
        assert!(matches!(outcome, NotifyOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_signals_live_observer() {
        use std::process::Command;

        // A child that ignores SIGUSR1 so delivery does not kill it.
        let mut child = Command::new("sh")
            .args(["-c", "trap '' USR1; sleep 5"])
            .spawn()
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(200));

        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join(".observer.pid");
        fs::write(&pid_file, child.id().to_string()).unwrap();

        let outcome = Notifier::new(&pid_file).notify();
        let _ = child.kill();
        let _ = child.wait();

        assert_eq!(
            outcome,
            NotifyOutcome::Signalled {
                pid: child.id() as i32
            }
        );
    }
}
