use crate::bridge::CaptureKind;
use crate::client::{
    AgenticRequest, AgenticResult, ChainResult, HistoryEntry, RefineRequest, RefinementResult,
};
use crate::error::RefinerError;
use crate::store::PersistedSettings;

use super::state::{ActivePage, Flow, OutputTab, PromptSlot};

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectMode(String),
    SelectPersona(String),
    Toggle(String),
    ApplyPreset(String),
    SelectModel(String),
    SetTemperature(f32),
    SetCustomInstructions(String),
    SelectPipeline(String),
    EditPrompt { slot: PromptSlot, text: String },
    RunFlow(Flow),
    CaptureInto { kind: CaptureKind, slot: PromptSlot },
    InjectFrom(PromptSlot),
    CopyOutput(PromptSlot),
    SelectOutputTab(OutputTab),
    ToggleStep(usize),
    ShowPage(ActivePage),
    RecallHistory(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowRequest {
    Single(RefineRequest),
    Chain(RefineRequest),
    Agentic(AgenticRequest),
}

impl FlowRequest {
    pub fn flow(&self) -> Flow {
        match self {
            FlowRequest::Single(_) => Flow::Single,
            FlowRequest::Chain(_) => Flow::Chain,
            FlowRequest::Agentic(_) => Flow::Agentic,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            FlowRequest::Single(req) | FlowRequest::Chain(req) => &req.prompt,
            FlowRequest::Agentic(req) => &req.prompt,
        }
    }
}

/// Side effect requested by the reducer, performed by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Whole-snapshot write; a failure is reported on `slot`.
    Persist {
        settings: PersistedSettings,
        slot: PromptSlot,
    },
    Request(FlowRequest),
    Capture { kind: CaptureKind, slot: PromptSlot },
    Inject { text: String, slot: PromptSlot },
    Copy { text: String, slot: PromptSlot },
    FetchHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowResponse {
    Single(RefinementResult),
    Chain(ChainResult),
    Agentic(AgenticResult),
}

/// Completion of an [`Effect`], fed back into the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Persisted {
        slot: PromptSlot,
        result: Result<(), RefinerError>,
    },
    Flow {
        flow: Flow,
        prompt: String,
        result: Result<FlowResponse, RefinerError>,
    },
    Captured {
        slot: PromptSlot,
        result: Result<String, RefinerError>,
    },
    Injected {
        slot: PromptSlot,
        result: Result<(), RefinerError>,
    },
    Copied {
        slot: PromptSlot,
        result: Result<(), RefinerError>,
    },
    History(Result<Vec<HistoryEntry>, RefinerError>),
}
