//! Human-readable suggestion report.
//!
//! The report is advisory text for stderr. It never goes to stdout, which
//! the host reserves for machine-readable hook output.

use crate::types::Suggestion;
use std::fmt::Write as _;
use std::io::{self, Write};

const TITLE: &str = "[Continuous Learning] Session pattern analysis";
const RULE_WIDTH: usize = 50;

/// Render the report, or `None` when there is nothing to say.
pub fn render(suggestions: &[Suggestion], total_events: usize) -> Option<String> {
    if suggestions.is_empty() {
        return None;
    }

    let rule = "═".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out);
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Analyzed {} events, found {} patterns:",
        total_events,
        suggestions.len()
    );
    let _ = writeln!(out);

    for (i, s) in suggestions.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", i + 1, s.kind, s.description);
        let _ = writeln!(out, "   {} (seen {} times)", s.suggestion, s.count);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Tip: run /instinct-status to review learned instincts");
    let _ = writeln!(out, "     run /evolve to cluster instincts into skills");
    let _ = writeln!(out, "{rule}");

    Some(out)
}

/// Write the report to `out`. Returns whether anything was written.
pub fn report<W: Write>(out: &mut W, suggestions: &[Suggestion], total_events: usize) -> io::Result<bool> {
    match render(suggestions, total_events) {
        Some(text) => {
            out.write_all(text.as_bytes())?;
            out.flush()?;
            Ok(true)
        }
        None => Ok(false),
    }
}
