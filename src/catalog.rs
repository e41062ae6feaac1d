//! Server-owned enumeration of selectable options.
//!
//! The catalog is read-only to the client: it is fetched from
//! `GET /api/settings` and `GET /api/models` at session start and used to
//! validate every id the client persists.

use serde::{Deserialize, Serialize};

/// Pipeline id the service reserves for ad-hoc agent lists; never selectable.
pub const CUSTOM_PIPELINE_ID: &str = "custom";

/// A named refinement style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A voice or role overlay applied alongside a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

impl Persona {
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

/// An independent boolean refinement feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A named bundle fixing mode, persona and toggle set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mode: String,
    pub persona: String,
    #[serde(default)]
    pub toggles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    pub role: String,
    #[serde(default)]
    pub instruction: String,
}

/// An ordered sequence of agent roles run in series by the agentic flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agents: Vec<AgentRole>,
}

impl Pipeline {
    /// Agent roles joined in execution order, e.g. `Critic → Editor`.
    pub fn agent_chain(&self) -> String {
        self.agents
            .iter()
            .map(|agent| agent.role.as_str())
            .collect::<Vec<_>>()
            .join(" \u{2192} ")
    }

    pub fn is_selectable(&self) -> bool {
        self.id != CUSTOM_PIPELINE_ID
    }
}

/// Body of `GET /api/settings`. Unknown keys (system prompts, etc.) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsCatalog {
    #[serde(rename = "refinement_modes")]
    pub modes: Vec<Mode>,
    pub personas: Vec<Persona>,
    pub toggles: Vec<Toggle>,
    pub presets: Vec<Preset>,
    #[serde(rename = "agentic_pipelines")]
    pub pipelines: Vec<Pipeline>,
}

/// Everything the client needs to render and validate selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub settings: SettingsCatalog,
    pub models: Vec<String>,
}

impl Catalog {
    pub fn new(settings: SettingsCatalog, models: Vec<String>) -> Self {
        Self { settings, models }
    }

    pub fn modes(&self) -> &[Mode] {
        &self.settings.modes
    }

    pub fn personas(&self) -> &[Persona] {
        &self.settings.personas
    }

    pub fn toggles(&self) -> &[Toggle] {
        &self.settings.toggles
    }

    pub fn presets(&self) -> &[Preset] {
        &self.settings.presets
    }

    /// Pipelines offered for selection, in server order.
    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.settings.pipelines.iter().filter(|p| p.is_selectable())
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn mode(&self, id: &str) -> Option<&Mode> {
        self.settings.modes.iter().find(|m| m.id == id)
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.settings.personas.iter().find(|p| p.id == id)
    }

    pub fn toggle(&self, id: &str) -> Option<&Toggle> {
        self.settings.toggles.iter().find(|t| t.id == id)
    }

    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.settings.presets.iter().find(|p| p.id == id)
    }

    pub fn pipeline(&self, id: &str) -> Option<&Pipeline> {
        self.pipelines().find(|p| p.id == id)
    }

    pub fn has_model(&self, id: &str) -> bool {
        self.models.iter().any(|m| m == id)
    }
}
