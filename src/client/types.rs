use serde::{Deserialize, Serialize};

use crate::error::RefinerError;
use crate::selection::{Configuration, DEFAULT_PIPELINE};

/// Body of `POST /api/refine` and `POST /api/refine/chain`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineRequest {
    pub prompt: String,
    pub mode: String,
    pub persona: String,
    pub toggles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    pub custom_instructions: String,
}

impl RefineRequest {
    /// Builds the payload from the current configuration. Blank prompts are
    /// rejected before any request is made.
    pub fn new(prompt: &str, config: &Configuration) -> Result<Self, RefinerError> {
        ensure_prompt(prompt)?;
        Ok(Self {
            prompt: prompt.to_string(),
            mode: config.mode.clone(),
            persona: config.persona.clone(),
            toggles: config.toggle_list(),
            model: config.model.clone(),
            temperature: config.temperature,
            custom_instructions: config.custom_instructions.clone(),
        })
    }
}

/// Body of `POST /api/refine/agentic`. Pipeline-driven, so mode, persona,
/// toggles and custom instructions are not sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgenticRequest {
    pub prompt: String,
    pub pipeline_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
}

impl AgenticRequest {
    pub fn new(prompt: &str, config: &Configuration) -> Result<Self, RefinerError> {
        ensure_prompt(prompt)?;
        Ok(Self {
            prompt: prompt.trim().to_string(),
            pipeline_id: config
                .pipeline
                .clone()
                .unwrap_or_else(|| DEFAULT_PIPELINE.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

fn ensure_prompt(prompt: &str) -> Result<(), RefinerError> {
    if prompt.trim().is_empty() {
        Err(RefinerError::EmptyPrompt)
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementResult {
    #[serde(default)]
    pub refined_prompt: String,
    #[serde(default)]
    pub changelog: String,
    #[serde(default)]
    pub metrics: String,
    #[serde(default)]
    pub composed_system_prompt: Option<String>,
    #[serde(default)]
    pub raw_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResult {
    pub pass_1: RefinementResult,
    #[serde(default)]
    pub pass_2: Option<RefinementResult>,
}

impl ChainResult {
    /// Second pass if present, else the first. The system prompt always
    /// comes from the first pass.
    pub fn effective(&self) -> RefinementResult {
        let mut result = self.pass_2.clone().unwrap_or_else(|| self.pass_1.clone());
        result.composed_system_prompt = self.pass_1.composed_system_prompt.clone();
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub agent: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgenticResult {
    pub final_prompt: String,
    #[serde(default)]
    pub steps: Vec<AgentStep>,
    #[serde(default)]
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub original_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Seconds since the epoch; the service sends fractional seconds.
    pub timestamp: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub pipeline: Option<String>,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub refined: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl HistoryEntry {
    /// Mode for refine entries, pipeline for agentic ones.
    pub fn label(&self) -> &str {
        self.mode
            .as_deref()
            .or(self.pipeline.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<String>,
}
