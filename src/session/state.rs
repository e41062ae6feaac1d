use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::RefinerError;
use crate::selection::Selection;

use super::display::{AgenticView, DisplayResult, HistoryView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Single,
    Chain,
    Agentic,
}

impl Flow {
    pub fn slot(self) -> PromptSlot {
        match self {
            Flow::Single | Flow::Chain => PromptSlot::Refine,
            Flow::Agentic => PromptSlot::Agentic,
        }
    }
}

/// Prompt input a capture writes into, and the panel an action reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSlot {
    Refine,
    Agentic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivePage {
    #[default]
    Refine,
    Agentic,
    History,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTab {
    #[default]
    Refined,
    Changelog,
    System,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStatus {
    /// Set while a request is in flight; a second trigger is ignored.
    pub busy: bool,
    pub error: Option<RefinerError>,
}

/// Short-lived confirmation of a completed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Captured(PromptSlot),
    Replaced(PromptSlot),
    Copied(PromptSlot),
}

/// Everything the session shows and mutates. Owned by the caller and passed
/// by reference to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub selection: Selection,
    /// `None` while the service is unreachable; selections are then inert.
    pub catalog: Option<Catalog>,
    pub startup_error: Option<String>,
    pub page: ActivePage,
    pub output_tab: OutputTab,
    pub refine_prompt: String,
    pub agentic_prompt: String,
    pub single: FlowStatus,
    pub chain: FlowStatus,
    pub agentic: FlowStatus,
    /// Inline errors from capture, injection, copy and settings edits.
    pub refine_notice: Option<RefinerError>,
    pub agentic_notice: Option<RefinerError>,
    pub feedback: Option<Feedback>,
    pub last_result: Option<DisplayResult>,
    pub last_agentic: Option<AgenticView>,
    pub history: HistoryView,
}

impl SessionState {
    pub fn is_online(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn status(&self, flow: Flow) -> &FlowStatus {
        match flow {
            Flow::Single => &self.single,
            Flow::Chain => &self.chain,
            Flow::Agentic => &self.agentic,
        }
    }

    pub fn status_mut(&mut self, flow: Flow) -> &mut FlowStatus {
        match flow {
            Flow::Single => &mut self.single,
            Flow::Chain => &mut self.chain,
            Flow::Agentic => &mut self.agentic,
        }
    }

    pub fn prompt(&self, slot: PromptSlot) -> &str {
        match slot {
            PromptSlot::Refine => &self.refine_prompt,
            PromptSlot::Agentic => &self.agentic_prompt,
        }
    }

    pub fn prompt_mut(&mut self, slot: PromptSlot) -> &mut String {
        match slot {
            PromptSlot::Refine => &mut self.refine_prompt,
            PromptSlot::Agentic => &mut self.agentic_prompt,
        }
    }

    pub fn notice(&self, slot: PromptSlot) -> Option<&RefinerError> {
        match slot {
            PromptSlot::Refine => self.refine_notice.as_ref(),
            PromptSlot::Agentic => self.agentic_notice.as_ref(),
        }
    }

    pub fn set_notice(&mut self, slot: PromptSlot, error: Option<RefinerError>) {
        match slot {
            PromptSlot::Refine => self.refine_notice = error,
            PromptSlot::Agentic => self.agentic_notice = error,
        }
    }
}
