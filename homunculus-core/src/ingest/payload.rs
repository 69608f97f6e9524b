//! Hook payload classification
//!
//! Hosts send loosely shaped JSON. Rather than probing fields ad hoc, a
//! payload is classified into one [`HookPayload`] variant, checked in a fixed
//! priority order:
//!
//! 1. `file_path` → [`HookPayload::FileEdit`]
//! 2. `command` → [`HookPayload::ShellExecution`]
//! 3. `hookType` → [`HookPayload::Hook`]
//! 4. `type` → [`HookPayload::Typed`]
//! 5. anything else → [`HookPayload::Unknown`]
//!
//! A field only counts when its value is truthy: `null`, `false`, `0` and the
//! empty string are treated as absent. Suggestion counts are sensitive to
//! this order, so keep it stable.

use crate::types::EventRecord;
use serde_json::Value;

/// Maximum length (in chars) of stored `input`/`output` values.
pub const MAX_FIELD_CHARS: usize = 5000;
/// Maximum length (in chars) of the raw payload kept for parse errors.
pub const MAX_RAW_CHARS: usize = 1000;

/// Recognized payload shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum HookPayload {
    /// `afterFileEdit`-style payload
    FileEdit { file_path: Value },
    /// `beforeShellExecution`-style payload
    ShellExecution { command: Value },
    /// Generic payload tagged with `hookType`
    Hook {
        hook_type: Value,
        tool: Option<Value>,
        input: Option<Value>,
        output: Option<Value>,
    },
    /// Generic payload tagged with `type`
    Typed {
        kind: Value,
        tool: Option<Value>,
        input: Option<Value>,
        output: Option<Value>,
    },
    /// Nothing recognizable (including non-object JSON)
    Unknown,
}

impl HookPayload {
    /// Classify a parsed payload.
    pub fn classify(data: &Value) -> Self {
        if let Some(file_path) = field(data, "file_path") {
            return HookPayload::FileEdit {
                file_path: file_path.clone(),
            };
        }
        if let Some(command) = field(data, "command") {
            return HookPayload::ShellExecution {
                command: command.clone(),
            };
        }
        if let Some(hook_type) = field(data, "hookType") {
            return HookPayload::Hook {
                hook_type: hook_type.clone(),
                tool: field(data, "tool").cloned(),
                input: field(data, "input").cloned(),
                output: field(data, "output").or_else(|| field(data, "result")).cloned(),
            };
        }
        if let Some(kind) = field(data, "type") {
            return HookPayload::Typed {
                kind: kind.clone(),
                tool: field(data, "tool").cloned(),
                input: field(data, "input").cloned(),
                output: field(data, "output").cloned(),
            };
        }
        HookPayload::Unknown
    }

    /// Normalize into a record for `session`.
    pub fn into_record(self, session: String) -> EventRecord {
        let record = match self {
            HookPayload::FileEdit { file_path } => EventRecord::new(EventRecord::FILE_EDIT)
                .with_tool("Edit")
                .with_input(truncated(&file_path)),
            HookPayload::ShellExecution { command } => {
                EventRecord::new(EventRecord::SHELL_EXECUTION)
                    .with_tool("Shell")
                    .with_input(truncated(&command))
            }
            HookPayload::Hook {
                hook_type: event,
                tool,
                input,
                output,
            }
            | HookPayload::Typed {
                kind: event,
                tool,
                input,
                output,
            } => {
                let event = text(&event);
                let mut record = EventRecord::new(event.clone());
                record.tool = Some(tool.as_ref().map(text).unwrap_or(event));
                record.input = input.as_ref().map(truncated);
                record.output = output.as_ref().map(truncated);
                record
            }
            HookPayload::Unknown => {
                EventRecord::new(EventRecord::UNKNOWN).with_tool(EventRecord::UNKNOWN)
            }
        };
        record.with_session(session)
    }
}

/// Session id: host environment first, then the payload's `session_id`.
pub fn resolve_session(env_session: Option<&str>, data: Option<&Value>) -> String {
    env_session
        .filter(|session| !session.is_empty())
        .map(str::to_string)
        .or_else(|| data.and_then(|data| field(data, "session_id")).map(text))
        .unwrap_or_else(|| EventRecord::UNKNOWN.to_string())
}

/// Synthetic record for a payload that is not valid JSON.
pub fn malformed_record(raw: &str, error: &serde_json::Error, session: String) -> EventRecord {
    let mut record = EventRecord::new(EventRecord::PARSE_ERROR).with_session(session);
    record.raw = Some(truncate_chars(raw, MAX_RAW_CHARS));
    record.error = Some(error.to_string());
    record
}

/// Keep at most `max` chars of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s.to_string(),
    }
}

fn field<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|value| truthy(value))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings verbatim; objects, arrays and scalars as canonical JSON text.
///
/// Object keys come out sorted, not in payload order.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncated(value: &Value) -> String {
    truncate_chars(&text(value), MAX_FIELD_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(data: Value) -> EventRecord {
        HookPayload::classify(&data).into_record("s1".to_string())
    }

    #[test]
    fn test_file_path_wins_over_command() {
        let record = normalize(json!({"file_path": "src/main.rs", "command": "ls"}));
        assert_eq!(record.event, "file_edit");
        assert_eq!(record.tool.as_deref(), Some("Edit"));
        assert_eq!(record.input.as_deref(), Some("src/main.rs"));
        assert_eq!(record.output, None);
    }

    #[test]
    fn test_command_payload() {
        let record = normalize(json!({"command": "npm test", "hookType": "beforeShellExecution"}));
        assert_eq!(record.event, "shell_execution");
        assert_eq!(record.tool.as_deref(), Some("Shell"));
        assert_eq!(record.input.as_deref(), Some("npm test"));
    }

    #[test]
    fn test_hook_type_payload_defaults_tool_to_hook_type() {
        let record = normalize(json!({"hookType": "stop", "result": {"ok": true}}));
        assert_eq!(record.event, "stop");
        assert_eq!(record.tool.as_deref(), Some("stop"));
        assert_eq!(record.input, None);
        assert_eq!(record.output.as_deref(), Some(r#"{"ok":true}"#));
    }

    #[test]
    fn test_hook_type_beats_type() {
        let record = normalize(json!({"hookType": "afterMCPExecution", "type": "other", "tool": "mcp"}));
        assert_eq!(record.event, "afterMCPExecution");
        assert_eq!(record.tool.as_deref(), Some("mcp"));
    }

    #[test]
    fn test_type_payload_ignores_result_field() {
        let record = normalize(json!({"type": "tool_use", "input": {"q": 1}, "result": "x"}));
        assert_eq!(record.event, "tool_use");
        assert_eq!(record.tool.as_deref(), Some("tool_use"));
        assert_eq!(record.input.as_deref(), Some(r#"{"q":1}"#));
        assert_eq!(record.output, None);
    }

    #[test]
    fn test_falsy_fields_are_absent() {
        let record = normalize(json!({"file_path": "", "command": null, "type": "ping", "input": 0}));
        assert_eq!(record.event, "ping");
        assert_eq!(record.input, None);
    }

    #[test]
    fn test_unrecognized_and_non_object_payloads() {
        for data in [json!({"foo": 1}), json!([1, 2]), json!(42), json!(null)] {
            let record = normalize(data);
            assert_eq!(record.event, "unknown");
            assert_eq!(record.tool.as_deref(), Some("unknown"));
            assert_eq!(record.input, None);
            assert_eq!(record.output, None);
        }
    }

    #[test]
    fn test_input_truncated_to_limit() {
        let long = "x".repeat(MAX_FIELD_CHARS + 250);
        let record = normalize(json!({"command": long}));
        assert_eq!(record.input.unwrap().chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn test_object_input_serialized_before_truncation() {
        let big = json!({"type": "t", "input": {"blob": "y".repeat(MAX_FIELD_CHARS)}});
        let input = normalize(big).input.unwrap();
        assert!(input.starts_with(r#"{"blob":"yyy"#));
        assert_eq!(input.chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn test_object_input_keys_are_sorted() {
        let data: Value = serde_json::from_str(r#"{"type":"t","input":{"zeta":1,"alpha":{"y":2,"x":3}}}"#).unwrap();
        let input = normalize(data).input.unwrap();
        assert_eq!(input, r#"{"alpha":{"x":3,"y":2},"zeta":1}"#);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_session_resolution_order() {
        let data = json!({"session_id": "from-payload"});
        assert_eq!(resolve_session(Some("from-env"), Some(&data)), "from-env");
        assert_eq!(resolve_session(None, Some(&data)), "from-payload");
        assert_eq!(resolve_session(Some(""), Some(&data)), "from-payload");
        assert_eq!(resolve_session(None, Some(&json!({}))), "unknown");
        assert_eq!(resolve_session(None, None), "unknown");
    }

    #[test]
    fn test_malformed_record_keeps_truncated_raw() {
        let raw = format!("{{not json{}", "z".repeat(2000));
        let error = serde_json::from_str::<Value>(&raw).unwrap_err();
        let record = malformed_record(&raw, &error, "unknown".to_string());

        assert_eq!(record.event, "parse_error");
        assert_eq!(record.tool, None);
        assert_eq!(record.raw.as_ref().unwrap().chars().count(), MAX_RAW_CHARS);
        assert!(record.error.is_some());
    }
}
