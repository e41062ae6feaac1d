//! Display model shared by all three flows.

use chrono::{Local, TimeZone};

use crate::client::{AgenticResult, HistoryEntry, RefinementResult};
use crate::metrics::LengthMetrics;

use super::state::{Flow, OutputTab};

pub const STEP_PREVIEW_CHARS: usize = 300;
pub const HISTORY_PREVIEW_CHARS: usize = 80;
pub const NO_CHANGELOG: &str = "No changelog.";
pub const HISTORY_EMPTY_MESSAGE: &str = "No refinements yet.";
pub const HISTORY_FAILED_MESSAGE: &str = "Cannot load (server offline?)";

/// Normalized single or chain result with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayResult {
    pub flow: Flow,
    pub result: RefinementResult,
    pub metrics: LengthMetrics,
}

impl DisplayResult {
    pub fn new(flow: Flow, original_prompt: &str, result: RefinementResult) -> Self {
        let metrics = LengthMetrics::compute(original_prompt, &result.refined_prompt);
        Self {
            flow,
            result,
            metrics,
        }
    }

    pub fn refined_text(&self) -> &str {
        if !self.result.refined_prompt.is_empty() {
            return &self.result.refined_prompt;
        }
        match self.result.raw_response.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => "--",
        }
    }

    pub fn changelog_text(&self) -> &str {
        if self.result.changelog.is_empty() {
            NO_CHANGELOG
        } else {
            &self.result.changelog
        }
    }

    pub fn system_text(&self) -> &str {
        self.result.composed_system_prompt.as_deref().unwrap_or_default()
    }

    pub fn tab_text(&self, tab: OutputTab) -> &str {
        match tab {
            OutputTab::Refined => self.refined_text(),
            OutputTab::Changelog => self.changelog_text(),
            OutputTab::System => self.system_text(),
        }
    }

    /// Raw text the copy action places on the clipboard.
    pub fn copy_text(&self, tab: OutputTab) -> &str {
        match tab {
            OutputTab::Refined => &self.result.refined_prompt,
            OutputTab::Changelog => &self.result.changelog,
            OutputTab::System => self.system_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: usize,
    pub agent: String,
    pub output: String,
    pub expanded: bool,
}

impl StepView {
    pub fn heading(&self) -> String {
        format!("Step {}: {}", self.number, self.agent)
    }

    pub fn is_truncatable(&self) -> bool {
        self.output.chars().count() > STEP_PREVIEW_CHARS
    }

    pub fn visible_text(&self) -> String {
        if self.expanded || !self.is_truncatable() {
            self.output.clone()
        } else {
            truncate_chars(&self.output, STEP_PREVIEW_CHARS)
        }
    }
}

/// Agentic result with steps kept in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgenticView {
    pub steps: Vec<StepView>,
    pub final_prompt: String,
}

impl AgenticView {
    pub fn new(result: AgenticResult) -> Self {
        let steps = result
            .steps
            .into_iter()
            .enumerate()
            .map(|(idx, step)| StepView {
                number: idx + 1,
                agent: step.agent,
                output: step.output,
                expanded: false,
            })
            .collect();
        Self {
            steps,
            final_prompt: result.final_prompt,
        }
    }

    /// Flips a step between preview and full output.
    pub fn toggle_step(&mut self, index: usize) -> bool {
        match self.steps.get_mut(index) {
            Some(step) if step.is_truncatable() => {
                step.expanded = !step.expanded;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub time: String,
    pub kind: String,
    pub label: String,
    pub preview: String,
    pub original: String,
}

impl HistoryRow {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            time: format_time(entry.timestamp),
            kind: entry.kind.clone(),
            label: entry.label().to_string(),
            preview: if entry.original.chars().count() > HISTORY_PREVIEW_CHARS {
                truncate_chars(&entry.original, HISTORY_PREVIEW_CHARS)
            } else {
                entry.original.clone()
            },
            original: entry.original.clone(),
        }
    }
}

/// History page state. Empty and failed loads are distinct.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryView {
    #[default]
    NotLoaded,
    Loading,
    Empty,
    Loaded(Vec<HistoryRow>),
    Failed,
}

impl HistoryView {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Loaded(entries.iter().map(HistoryRow::from_entry).collect())
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            HistoryView::Empty => Some(HISTORY_EMPTY_MESSAGE),
            HistoryView::Failed => Some(HISTORY_FAILED_MESSAGE),
            _ => None,
        }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            HistoryView::Loaded(rows) => rows,
            _ => &[],
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

fn format_time(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
