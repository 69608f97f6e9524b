//! Bounded read of the hook payload.

use std::io::{self, Read};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Read `reader` to EOF, giving up after `timeout`.
///
/// On timeout whatever arrived so far is returned. A read error yields an
/// empty payload. The reader thread is left behind on timeout; it dies with
/// the process.
pub fn read_with_timeout<R>(reader: R, timeout: Duration) -> String
where
    R: Read + Send + 'static,
{
    let received = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let sink = Arc::clone(&received);
    let spawned = thread::Builder::new()
        .name("payload-reader".to_string())
        .spawn(move || {
            let mut reader = reader;
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "Payload read failed");
                        if let Ok(mut buf) = sink.lock() {
                            buf.clear();
                        }
                        break;
                    }
                }
            }
            let _ = done_tx.send(());
        });

    if let Err(e) = spawned {
        tracing::debug!(error = %e, "Could not spawn payload reader");
        return String::new();
    }

    if done_rx.recv_timeout(timeout).is_err() {
        tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Payload read timed out");
    }

    let bytes = received.lock().map(|buf| buf.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
