//! Frequency models over the observation log and their suggestions.

use super::frequency::FrequencyTable;
use crate::config::AnalysisConfig;
use crate::types::{EventRecord, Suggestion, SuggestionKind};
use serde_json::{json, Value};
use std::fmt;

/// Default minimum occurrences for a pattern to be suggested.
pub const DEFAULT_MIN_COUNT: usize = 3;
/// Fewer records than this is "insufficient data".
pub const MIN_OBSERVATIONS: usize = 10;

const MAX_WORKFLOWS: usize = 5;
const MAX_COMMANDS: usize = 3;
const MAX_FILE_PATTERNS: usize = 3;

/// Extension key for files without one.
pub const NO_EXTENSION: &str = "no-ext";

/// One adjacent pair of tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// All frequency tables derived from one scan of the store.
#[derive(Debug, Clone, Default)]
pub struct PatternModels {
    /// `tool(i) → tool(i+1)` across the whole log, ignoring session boundaries
    pub transitions: FrequencyTable<Transition>,
    /// Leading token of `shell_execution` inputs
    pub commands: FrequencyTable<String>,
    /// Extension of `file_edit` inputs
    pub extensions: FrequencyTable<String>,
    /// Per-tool usage
    pub tools: FrequencyTable<String>,
}

impl PatternModels {
    pub fn build(records: &[EventRecord]) -> Self {
        let mut models = Self::default();

        for pair in records.windows(2) {
            models.transitions.record(Transition {
                from: pair[0].tool_or_unknown().to_string(),
                to: pair[1].tool_or_unknown().to_string(),
            });
        }

        for record in records {
            models.tools.record(record.tool_or_unknown().to_string());

            let Some(input) = record.non_empty_input() else {
                continue;
            };
            match record.event.as_str() {
                EventRecord::SHELL_EXECUTION => {
                    if let Some(command) = command_token(input) {
                        models.commands.record(command.to_string());
                    }
                }
                EventRecord::FILE_EDIT => {
                    let ext = file_extension(input).unwrap_or(NO_EXTENSION);
                    models.extensions.record(ext.to_string());
                }
                _ => {}
            }
        }

        models
    }

    /// Machine-readable dump of every table, in first-seen order.
    pub fn to_json(&self) -> Value {
        let counted = |table: &FrequencyTable<String>| {
            table
                .iter()
                .map(|(key, count)| json!({ "key": key, "count": count }))
                .collect::<Vec<_>>()
        };

        json!({
            "transitions": self
                .transitions
                .iter()
                .map(|(t, count)| json!({ "from": t.from, "to": t.to, "count": count }))
                .collect::<Vec<_>>(),
            "commands": counted(&self.commands),
            "extensions": counted(&self.extensions),
            "tools": counted(&self.tools),
        })
    }
}

/// Command name with arguments stripped.
pub fn command_token(input: &str) -> Option<&str> {
    input.split_whitespace().next()
}

/// Extension of the last path component, dot included (`.rs`).
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn file_extension(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(|c| c == '/' || c == '\\');
    let base = trimmed
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed);
    match base.rfind('.') {
        None | Some(0) => None,
        Some(dot) => Some(&base[dot..]),
    }
}

/// Mines ranked suggestions from the observation log.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    min_count: usize,
    min_observations: usize,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COUNT)
    }
}

impl PatternAnalyzer {
    pub fn new(min_count: usize) -> Self {
        Self {
            min_count,
            min_observations: MIN_OBSERVATIONS,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.min_count).with_min_observations(config.min_observations)
    }

    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Whether `records` is enough data to analyze.
    pub fn has_enough_data(&self, records: &[EventRecord]) -> bool {
        records.len() >= self.min_observations
    }

    /// Suggestions for `records`: workflows, then commands, then file types.
    ///
    /// Returns nothing when there is not enough data.
    pub fn analyze(&self, records: &[EventRecord]) -> Vec<Suggestion> {
        if !self.has_enough_data(records) {
            tracing::debug!(
                records = records.len(),
                required = self.min_observations,
                "Not enough observations to analyze"
            );
            return Vec::new();
        }
        self.suggest(&PatternModels::build(records))
    }

    /// Rank and render already-built models.
    pub fn suggest(&self, models: &PatternModels) -> Vec<Suggestion> {
        let workflows = models
            .transitions
            .ranked(self.min_count, MAX_WORKFLOWS)
            .into_iter()
            .map(|(t, count)| Suggestion {
                kind: SuggestionKind::Workflow,
                description: format!("Tool sequence: {t}"),
                count,
                suggestion: format!("Executing {} is frequently followed by {}", t.from, t.to),
            });

        let commands = models
            .commands
            .ranked(self.min_count, MAX_COMMANDS)
            .into_iter()
            .map(|(cmd, count)| Suggestion {
                kind: SuggestionKind::ToolPreference,
                description: format!("Frequent command: {cmd}"),
                count,
                suggestion: format!("Runs the {cmd} command frequently ({count} times)"),
            });

        let file_patterns = models
            .extensions
            .ranked(self.min_count, MAX_FILE_PATTERNS)
            .into_iter()
            .map(|(ext, count)| Suggestion {
                kind: SuggestionKind::FilePattern,
                description: format!("Edited file type: {ext}"),
                count,
                suggestion: format!("Mostly edits {ext} files ({count} times)"),
            });

        workflows.chain(commands).chain(file_patterns).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(tool: &str) -> EventRecord {
        EventRecord::new("hook").with_tool(tool)
    }

    fn shell(command: &str) -> EventRecord {
        EventRecord::new(EventRecord::SHELL_EXECUTION)
            .with_tool("Shell")
            .with_input(command)
    }

    fn edit(path: &str) -> EventRecord {
        EventRecord::new(EventRecord::FILE_EDIT)
            .with_tool("Edit")
            .with_input(path)
    }

    #[test]
    fn test_insufficient_data_yields_nothing() {
        let records: Vec<_> = (0..9).map(|_| tool("Edit")).collect();
        assert!(PatternAnalyzer::new(1).analyze(&records).is_empty());
    }

    #[test]
    fn test_alternating_tools_yield_only_workflows() {
        let records: Vec<_> = (0..12)
            .map(|i| tool(if i % 2 == 0 { "Edit" } else { "Shell" }))
            .collect();

        let suggestions = PatternAnalyzer::new(3).analyze(&records);

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().all(|s| s.kind == SuggestionKind::Workflow));
        assert_eq!(suggestions[0].description, "Tool sequence: Edit → Shell");
        assert_eq!(suggestions[0].count, 6);
        assert_eq!(suggestions[1].description, "Tool sequence: Shell → Edit");
        assert_eq!(suggestions[1].count, 5);
        assert_eq!(
            suggestions[0].suggestion,
            "Executing Edit is frequently followed by Shell"
        );
    }

    #[test]
    fn test_command_token_strips_arguments() {
        let mut records: Vec<_> = (0..4).map(|_| shell("npm test")).collect();
        records.extend((0..2).map(|_| shell("npm run build")));
        records.extend((0..4).map(|i| tool(&format!("t{i}"))));

        let suggestions = PatternAnalyzer::new(3).analyze(&records);
        let commands: Vec<_> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::ToolPreference)
            .collect();

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].description, "Frequent command: npm");
        assert_eq!(commands[0].count, 6);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut records: Vec<_> = (0..3).map(|_| edit("a.rs")).collect();
        records.extend((0..2).map(|_| edit("b.toml")));
        records.extend((0..5).map(|i| tool(&format!("t{i}"))));

        let files: Vec<_> = PatternAnalyzer::new(3)
            .analyze(&records)
            .into_iter()
            .filter(|s| s.kind == SuggestionKind::FilePattern)
            .collect();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].description, "Edited file type: .rs");
    }

    #[test]
    fn test_section_order_and_caps() {
        let mut records = Vec::new();
        for name in ["a", "b", "c", "d", "e", "f", "g"] {
            for _ in 0..3 {
                records.push(shell(&format!("{name} --flag")));
            }
        }
        for ext in ["x.py", "y.ts", "z.go", "w.md"] {
            for _ in 0..3 {
                records.push(edit(ext));
            }
        }

        let suggestions = PatternAnalyzer::new(3).analyze(&records);
        let kinds: Vec<_> = suggestions.iter().map(|s| s.kind).collect();

        let workflows = kinds.iter().filter(|k| **k == SuggestionKind::Workflow).count();
        assert_eq!(workflows, 2);
        assert_eq!(&kinds[..2], &[SuggestionKind::Workflow, SuggestionKind::Workflow]);
        assert_eq!(
            &kinds[2..],
            &[
                SuggestionKind::ToolPreference,
                SuggestionKind::ToolPreference,
                SuggestionKind::ToolPreference,
                SuggestionKind::FilePattern,
                SuggestionKind::FilePattern,
                SuggestionKind::FilePattern,
            ]
        );
        assert_eq!(suggestions[2].description, "Frequent command: a");
        assert_eq!(suggestions[5].description, "Edited file type: .py");
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let records: Vec<_> = ["Edit", "Shell", "Read", "Edit", "Shell", "Read", "Edit", "Shell", "Read", "Edit", "Shell"]
            .iter()
            .map(|t| tool(t))
            .collect();
        let analyzer = PatternAnalyzer::new(2);
        assert_eq!(analyzer.analyze(&records), analyzer.analyze(&records));
    }

    #[test]
    fn test_missing_tool_counts_as_unknown() {
        let records = vec![EventRecord::new("parse_error"), tool("Edit")];
        let models = PatternModels::build(&records);
        let transition = Transition {
            from: "unknown".into(),
            to: "Edit".into(),
        };
        assert_eq!(models.transitions.count(&transition), 1);
        assert_eq!(models.tools.count(&"unknown".to_string()), 1);
    }

    #[test]
    fn test_empty_inputs_are_not_counted() {
        let models = PatternModels::build(&[shell(""), shell("   "), edit("")]);
        assert!(models.commands.is_empty());
        assert!(models.extensions.is_empty());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("src/lib.rs"), Some(".rs"));
        assert_eq!(file_extension("archive.tar.gz"), Some(".gz"));
        assert_eq!(file_extension("/home/u/.bashrc"), None);
        assert_eq!(file_extension("Makefile"), None);
        assert_eq!(file_extension("C:\\work\\main.c"), Some(".c"));
        assert_eq!(file_extension("dir.d/README"), None);
    }

    #[test]
    fn test_models_json_shape() {
        let models = PatternModels::build(&[shell("ls -la"), edit("a.rs")]);
        let value = models.to_json();

        assert_eq!(value["transitions"][0]["from"], "Shell");
        assert_eq!(value["transitions"][0]["to"], "Edit");
        assert_eq!(value["commands"][0]["key"], "ls");
        assert_eq!(value["extensions"][0]["key"], ".rs");
        assert_eq!(value["tools"].as_array().unwrap().len(), 2);
    }
}
