//! Current refinement configuration and its reconciliation against the catalog.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Preset};
use crate::error::RefinerError;
use crate::store::PersistedSettings;

pub const DEFAULT_MODE: &str = "professional";
pub const DEFAULT_PERSONA: &str = "none";
pub const DEFAULT_PIPELINE: &str = "full_review";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Models tried in order when the persisted model is not available.
pub const PREFERRED_MODELS: [&str; 4] = ["llama3.1:8b", "llama3:8b", "qwen2.5:7b", "mistral:7b"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub mode: String,
    pub persona: String,
    pub toggles: BTreeSet<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub custom_instructions: String,
    pub pipeline: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            toggles: BTreeSet::new(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            custom_instructions: String::new(),
            pipeline: Some(DEFAULT_PIPELINE.to_string()),
        }
    }
}

impl Configuration {
    /// Merges persisted values with the catalog. Absent or unknown ids fall
    /// back to catalog defaults.
    pub fn initialize(persisted: &PersistedSettings, catalog: &Catalog) -> Self {
        let mode = persisted
            .mode
            .as_deref()
            .filter(|id| catalog.mode(id).is_some())
            .map(str::to_string)
            .unwrap_or_else(|| {
                fallback_id(DEFAULT_MODE, catalog.modes().iter().map(|m| m.id.as_str()))
            });
        let persona = persisted
            .persona
            .as_deref()
            .filter(|id| catalog.persona(id).is_some())
            .map(str::to_string)
            .unwrap_or_else(|| {
                fallback_id(
                    DEFAULT_PERSONA,
                    catalog.personas().iter().map(|p| p.id.as_str()),
                )
            });
        let toggles = persisted
            .toggles
            .iter()
            .flatten()
            .filter(|id| catalog.toggle(id).is_some())
            .cloned()
            .collect();
        let pipeline = persisted
            .pipeline
            .as_deref()
            .filter(|id| catalog.pipeline(id).is_some())
            .map(str::to_string)
            .or_else(|| {
                let ids: Vec<&str> = catalog.pipelines().map(|p| p.id.as_str()).collect();
                if ids.is_empty() {
                    None
                } else {
                    Some(fallback_id(DEFAULT_PIPELINE, ids.into_iter()))
                }
            });

        Self {
            mode,
            persona,
            toggles,
            model: select_model(persisted.model.as_deref(), catalog.models()),
            temperature: clamp_temperature(persisted.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            custom_instructions: persisted.custom_instructions.clone().unwrap_or_default(),
            pipeline,
        }
    }

    /// Rebuilds a configuration without a catalog, for inert display while
    /// the service is offline.
    pub fn from_persisted(persisted: &PersistedSettings) -> Self {
        let defaults = Self::default();
        Self {
            mode: persisted.mode.clone().unwrap_or(defaults.mode),
            persona: persisted.persona.clone().unwrap_or(defaults.persona),
            toggles: persisted.toggles.iter().flatten().cloned().collect(),
            model: persisted.model.clone(),
            temperature: clamp_temperature(persisted.temperature.unwrap_or(defaults.temperature)),
            custom_instructions: persisted.custom_instructions.clone().unwrap_or_default(),
            pipeline: persisted.pipeline.clone().or(defaults.pipeline),
        }
    }

    /// Full snapshot for the settings store.
    pub fn snapshot(&self) -> PersistedSettings {
        PersistedSettings {
            mode: Some(self.mode.clone()),
            toggles: Some(self.toggle_list()),
            persona: Some(self.persona.clone()),
            temperature: Some(self.temperature),
            model: self.model.clone(),
            custom_instructions: Some(self.custom_instructions.clone()),
            pipeline: self.pipeline.clone(),
        }
    }

    pub fn toggle_list(&self) -> Vec<String> {
        self.toggles.iter().cloned().collect()
    }
}

/// Picks the persisted model if the catalog has it, else the first preferred
/// model present, else the catalog's first model.
pub fn select_model(persisted: Option<&str>, available: &[String]) -> Option<String> {
    if let Some(saved) = persisted.filter(|m| available.iter().any(|a| a == m)) {
        return Some(saved.to_string());
    }
    PREFERRED_MODELS
        .iter()
        .find(|pref| available.iter().any(|a| a == *pref))
        .map(|pref| pref.to_string())
        .or_else(|| available.first().cloned())
}

pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        return DEFAULT_TEMPERATURE;
    }
    value.clamp(*TEMPERATURE_RANGE.start(), *TEMPERATURE_RANGE.end())
}

fn fallback_id<'a>(preferred: &str, mut ids: impl Iterator<Item = &'a str> + Clone) -> String {
    if ids.clone().any(|id| id == preferred) {
        return preferred.to_string();
    }
    ids.next().unwrap_or(preferred).to_string()
}

/// Configuration plus the visibly active preset.
///
/// The preset marking is display state only and is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub config: Configuration,
    pub active_preset: Option<String>,
}

impl Selection {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            active_preset: None,
        }
    }

    /// Sets mode, persona and the whole toggle set as one unit.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.config.mode = preset.mode.clone();
        self.config.persona = preset.persona.clone();
        self.config.toggles = preset.toggles.iter().cloned().collect();
        self.active_preset = Some(preset.id.clone());
    }

    /// Flips membership of one toggle. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.active_preset = None;
        if self.config.toggles.remove(id) {
            false
        } else {
            self.config.toggles.insert(id.to_string());
            true
        }
    }

    pub fn select_mode(&mut self, id: &str) {
        self.config.mode = id.to_string();
        self.active_preset = None;
    }

    pub fn select_persona(&mut self, id: &str) {
        self.config.persona = id.to_string();
        self.active_preset = None;
    }

    pub fn select_model(&mut self, id: &str) {
        self.config.model = Some(id.to_string());
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.config.temperature = clamp_temperature(value);
    }

    pub fn set_custom_instructions(&mut self, text: &str) {
        self.config.custom_instructions = text.to_string();
    }

    pub fn select_pipeline(&mut self, id: &str) {
        self.config.pipeline = Some(id.to_string());
    }
}

/// Rejects ids the catalog does not offer.
pub fn ensure_known(kind: &'static str, id: &str, known: bool) -> Result<(), RefinerError> {
    if known {
        Ok(())
    } else {
        Err(RefinerError::UnknownOption {
            kind,
            id: id.to_string(),
        })
    }
}
