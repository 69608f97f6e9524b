//! Core domain types for homunculus
//!
//! An [`EventRecord`] is one line of the observation log. A [`Suggestion`] is
//! the ephemeral, human-readable output of a pattern analysis run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Event records
// ============================================

/// One normalized, immutable observation of a tool-use action.
///
/// Optional fields are omitted from the serialized line rather than written
/// as `null`. Every record this crate appends carries a timestamp.
///
/// Deserialization never rejects a JSON object: unknown fields are ignored, a
/// missing or unparseable `timestamp` reads as `None`, and non-string field
/// values are kept as their JSON text. Lines written by other tools still
/// count toward analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Assigned at append time
    #[serde(default, with = "iso8601_millis", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Open tag: `file_edit`, `shell_execution`, `stop`, `unknown`, `parse_error`, ...
    #[serde(default = "unknown", deserialize_with = "lenient::event")]
    pub event: String,
    /// Acting capability (e.g. `Edit`, `Shell`)
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Originating session id
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Truncated raw payload (parse errors only)
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Parser error description (parse errors only)
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn unknown() -> String {
    EventRecord::UNKNOWN.to_string()
}

impl EventRecord {
    pub const FILE_EDIT: &'static str = "file_edit";
    pub const SHELL_EXECUTION: &'static str = "shell_execution";
    pub const PARSE_ERROR: &'static str = "parse_error";
    pub const UNKNOWN: &'static str = "unknown";

    /// Create a record stamped with the current time.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            timestamp: Some(Utc::now()),
            event: event.into(),
            tool: None,
            input: None,
            output: None,
            session: None,
            raw: None,
            error: None,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Tool name, or `unknown` when the record has none.
    pub fn tool_or_unknown(&self) -> &str {
        self.tool.as_deref().unwrap_or(Self::UNKNOWN)
    }

    /// Input text when present and non-empty.
    pub fn non_empty_input(&self) -> Option<&str> {
        self.input.as_deref().filter(|input| !input.is_empty())
    }

    /// Decode one stored line that has already been parsed as JSON.
    ///
    /// Objects are read leniently. Other JSON values that are not empty,
    /// `false`, `0` or `null` still stand for one observation with no fields.
    pub fn from_stored(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        if value.is_object() {
            return serde_json::from_value(value).ok();
        }
        let falsy = match &value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty(),
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::Array(_) | Value::Object(_) => false,
        };
        (!falsy).then(|| Self {
            timestamp: None,
            ..Self::new(Self::UNKNOWN)
        })
    }

    /// Serialize as a single log line, newline included.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
///
/// Anything that is not an RFC 3339 string reads as `None`.
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc)))
    }
}

/// Field readers that accept any JSON value.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings verbatim, `null` as absent, anything else as its JSON text.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    pub fn event<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(text(deserializer)?.unwrap_or_else(super::unknown))
    }
}

// ============================================
// Suggestions
// ============================================

/// Which pattern model a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    /// Adjacent tool transition
    Workflow,
    /// Frequently used shell command
    ToolPreference,
    /// Frequently edited file extension
    FilePattern,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Workflow => "workflow",
            SuggestionKind::ToolPreference => "tool-preference",
            SuggestionKind::FilePattern => "file-pattern",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked, human-readable rendering of one pattern above threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub description: String,
    pub count: usize,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let record = EventRecord::new("stop").with_tool("stop");
        let line = record.to_line().unwrap();

        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert!(!line.contains("null"));
        assert!(!line.contains("\"input\""));
        assert!(!line.contains("\"raw\""));
    }

    #[test]
    fn test_timestamp_uses_millisecond_iso8601() {
        let ts = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.678Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut record = EventRecord::new("stop");
        record.timestamp = Some(ts);

        let value: serde_json::Value = serde_json::from_str(&record.to_line().unwrap()).unwrap();
        assert_eq!(value["timestamp"], "2026-01-02T03:04:05.678Z");
    }

    #[test]
    fn test_lenient_deserialize() {
        let line = r#"{"timestamp":"2026-01-02T03:04:05.000Z","raw":"{oops","extra":1}"#;
        let record: EventRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.event, "unknown");
        assert_eq!(record.tool_or_unknown(), "unknown");
        assert_eq!(record.raw.as_deref(), Some("{oops"));
    }

    #[test]
    fn test_foreign_lines_still_load() {
        let no_timestamp: EventRecord =
            serde_json::from_str(r#"{"event":"shell_execution","tool":"Shell","input":"ls"}"#).unwrap();
        assert_eq!(no_timestamp.timestamp, None);
        assert_eq!(no_timestamp.input.as_deref(), Some("ls"));

        let odd_fields: EventRecord =
            serde_json::from_str(r#"{"timestamp":"yesterday","event":7,"tool":{"n":1},"input":null}"#)
                .unwrap();
        assert_eq!(odd_fields.timestamp, None);
        assert_eq!(odd_fields.event, "7");
        assert_eq!(odd_fields.tool.as_deref(), Some(r#"{"n":1}"#));
        assert_eq!(odd_fields.input, None);
    }

    #[test]
    fn test_from_stored_skips_falsy_values() {
        for falsy in ["null", "false", "0", "\"\""] {
            let value = serde_json::from_str(falsy).unwrap();
            assert!(EventRecord::from_stored(value).is_none(), "{falsy} should be skipped");
        }

        let bare = EventRecord::from_stored(serde_json::json!(42)).unwrap();
        assert_eq!(bare.event, "unknown");
        assert_eq!(bare.tool, None);
        assert_eq!(bare.timestamp, None);
    }

    #[test]
    fn test_suggestion_kind_serializes_kebab_case() {
        let suggestion = Suggestion {
            kind: SuggestionKind::ToolPreference,
            description: "d".into(),
            count: 3,
            suggestion: "s".into(),
        };
        let value = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(value["type"], "tool-preference");
    }
}
