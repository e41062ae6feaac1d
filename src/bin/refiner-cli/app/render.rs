use std::fmt::Write;

use prompt_refiner::catalog::Catalog;
use prompt_refiner::session::{AgenticView, DisplayResult, HistoryView, SessionState};

const NONE: &str = "(none)";

pub fn status(state: &SessionState) -> String {
    let mut out = String::new();
    match &state.startup_error {
        Some(message) => {
            let _ = writeln!(out, "Service: {message}");
        }
        None => out.push_str("Service: online\n"),
    }
    out.push_str(&selection(state));
    if let Some(catalog) = &state.catalog {
        out.push('\n');
        out.push_str(&catalog_listing(catalog, state));
    }
    out
}

/// Current configuration. Offline sessions show the raw persisted ids.
pub fn selection(state: &SessionState) -> String {
    let config = &state.selection.config;
    let catalog = state.catalog.as_ref();
    let persona = catalog
        .and_then(|c| c.persona(&config.persona))
        .map(|p| p.label())
        .unwrap_or_else(|| config.persona.clone());
    let toggles = if config.toggles.is_empty() {
        NONE.to_string()
    } else {
        config.toggle_list().join(", ")
    };
    let pipeline = match config.pipeline.as_deref() {
        Some(id) => match catalog.and_then(|c| c.pipeline(id)) {
            Some(pipeline) => format!("{id} ({})", pipeline.agent_chain()),
            None => id.to_string(),
        },
        None => NONE.to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Mode:         {}", config.mode);
    let _ = writeln!(out, "Persona:      {persona}");
    let _ = writeln!(out, "Toggles:      {toggles}");
    let _ = writeln!(
        out,
        "Preset:       {}",
        state.selection.active_preset.as_deref().unwrap_or(NONE)
    );
    let _ = writeln!(
        out,
        "Model:        {}",
        config.model.as_deref().unwrap_or(NONE)
    );
    let _ = writeln!(out, "Temperature:  {:.1}", config.temperature);
    if !config.custom_instructions.is_empty() {
        let _ = writeln!(out, "Instructions: {}", config.custom_instructions);
    }
    let _ = writeln!(out, "Pipeline:     {pipeline}");
    out
}

fn catalog_listing(catalog: &Catalog, state: &SessionState) -> String {
    let config = &state.selection.config;
    let mark = |selected: bool| if selected { '*' } else { ' ' };
    let mut out = String::new();

    out.push_str("Modes:\n");
    for mode in catalog.modes() {
        let _ = writeln!(out, "  {} {:<16} {}", mark(mode.id == config.mode), mode.id, mode.name);
    }
    out.push_str("Personas:\n");
    for persona in catalog.personas() {
        let _ = writeln!(
            out,
            "  {} {:<16} {}",
            mark(persona.id == config.persona),
            persona.id,
            persona.label()
        );
    }
    out.push_str("Toggles:\n");
    for toggle in catalog.toggles() {
        let _ = writeln!(
            out,
            "  {} {:<16} {}",
            mark(config.toggles.contains(&toggle.id)),
            toggle.id,
            toggle.name
        );
    }
    if !catalog.presets().is_empty() {
        out.push_str("Presets:\n");
        for preset in catalog.presets() {
            let active = state.selection.active_preset.as_deref() == Some(preset.id.as_str());
            let _ = writeln!(out, "  {} {:<16} {}", mark(active), preset.id, preset.name);
        }
    }
    out.push_str("Pipelines:\n");
    for pipeline in catalog.pipelines() {
        let _ = writeln!(
            out,
            "  {} {:<16} {}",
            mark(config.pipeline.as_deref() == Some(pipeline.id.as_str())),
            pipeline.id,
            pipeline.agent_chain()
        );
    }
    out.push_str("Models:\n");
    for model in catalog.models() {
        let _ = writeln!(out, "  {} {model}", mark(config.model.as_deref() == Some(model.as_str())));
    }
    out
}

pub fn refine_result(display: &DisplayResult) -> String {
    let metrics = &display.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", display.refined_text());
    let _ = writeln!(out, "Changelog:\n{}\n", display.changelog_text());
    let _ = write!(
        out,
        "Words: {} -> {} ({}%)",
        metrics.original_words, metrics.refined_words, metrics.ratio
    );
    if metrics.is_outlier() {
        out.push_str(" !");
    }
    out.push('\n');
    if !display.result.metrics.is_empty() {
        let _ = writeln!(out, "Quality: {}", display.result.metrics);
    }
    out
}

pub fn agentic_result(view: &AgenticView) -> String {
    let mut out = String::new();
    for step in &view.steps {
        let _ = writeln!(out, "{}", step.heading());
        for line in step.visible_text().lines() {
            let _ = writeln!(out, "  {line}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Final prompt:\n{}", view.final_prompt);
    out
}

pub fn history(view: &HistoryView) -> String {
    if let Some(message) = view.message() {
        return format!("{message}\n");
    }
    let mut out = String::new();
    for (index, row) in view.rows().iter().enumerate() {
        let _ = writeln!(
            out,
            "[{index}] {} {:<8} {:<14} {}",
            row.time, row.kind, row.label, row.preview
        );
    }
    out
}
