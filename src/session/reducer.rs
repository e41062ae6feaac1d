//! State transitions. `reduce` turns an intent into a state change plus an
//! effect to perform; `apply` folds the effect's outcome back in.

use crate::catalog::Catalog;
use crate::client::{AgenticRequest, RefineRequest};
use crate::error::RefinerError;
use crate::selection::{ensure_known, Selection};

use super::display::{AgenticView, DisplayResult, HistoryView};
use super::intent::{Effect, FlowRequest, FlowResponse, Intent, Outcome};
use super::state::{ActivePage, Feedback, Flow, PromptSlot, SessionState};

pub fn reduce(state: &mut SessionState, intent: Intent) -> Effect {
    match intent {
        Intent::SelectMode(id) => edit_selection(state, PromptSlot::Refine, |catalog, sel| {
            ensure_known("mode", &id, catalog.mode(&id).is_some())?;
            sel.select_mode(&id);
            Ok(())
        }),
        Intent::SelectPersona(id) => edit_selection(state, PromptSlot::Refine, |catalog, sel| {
            ensure_known("persona", &id, catalog.persona(&id).is_some())?;
            sel.select_persona(&id);
            Ok(())
        }),
        Intent::Toggle(id) => edit_selection(state, PromptSlot::Refine, |catalog, sel| {
            ensure_known("toggle", &id, catalog.toggle(&id).is_some())?;
            sel.toggle(&id);
            Ok(())
        }),
        Intent::ApplyPreset(id) => edit_selection(state, PromptSlot::Refine, |catalog, sel| {
            let preset = catalog.preset(&id).ok_or_else(|| RefinerError::UnknownOption {
                kind: "preset",
                id: id.clone(),
            })?;
            sel.apply_preset(preset);
            Ok(())
        }),
        Intent::SelectModel(id) => edit_selection(state, PromptSlot::Refine, |catalog, sel| {
            ensure_known("model", &id, catalog.has_model(&id))?;
            sel.select_model(&id);
            Ok(())
        }),
        Intent::SetTemperature(value) => edit_selection(state, PromptSlot::Refine, |_, sel| {
            sel.set_temperature(value);
            Ok(())
        }),
        Intent::SetCustomInstructions(text) => {
            edit_selection(state, PromptSlot::Refine, |_, sel| {
                sel.set_custom_instructions(&text);
                Ok(())
            })
        }
        Intent::SelectPipeline(id) => edit_selection(state, PromptSlot::Agentic, |catalog, sel| {
            ensure_known("pipeline", &id, catalog.pipeline(&id).is_some())?;
            sel.select_pipeline(&id);
            Ok(())
        }),
        Intent::EditPrompt { slot, text } => {
            *state.prompt_mut(slot) = text;
            Effect::None
        }
        Intent::RunFlow(flow) => start_flow(state, flow),
        Intent::CaptureInto { kind, slot } => {
            state.feedback = None;
            state.set_notice(slot, None);
            Effect::Capture { kind, slot }
        }
        Intent::InjectFrom(slot) => {
            state.feedback = None;
            match result_text(state, slot) {
                Some(text) => {
                    state.set_notice(slot, None);
                    Effect::Inject { text, slot }
                }
                None => Effect::None,
            }
        }
        Intent::CopyOutput(slot) => {
            state.feedback = None;
            let text = match slot {
                PromptSlot::Refine => state
                    .last_result
                    .as_ref()
                    .map(|r| r.copy_text(state.output_tab).to_string()),
                PromptSlot::Agentic => state.last_agentic.as_ref().map(|a| a.final_prompt.clone()),
            };
            match text {
                Some(text) => Effect::Copy { text, slot },
                None => Effect::None,
            }
        }
        Intent::SelectOutputTab(tab) => {
            state.output_tab = tab;
            Effect::None
        }
        Intent::ToggleStep(index) => {
            if let Some(view) = state.last_agentic.as_mut() {
                view.toggle_step(index);
            }
            Effect::None
        }
        Intent::ShowPage(page) => {
            state.page = page;
            if page == ActivePage::History {
                state.history = HistoryView::Loading;
                Effect::FetchHistory
            } else {
                Effect::None
            }
        }
        Intent::RecallHistory(index) => {
            if let Some(row) = state.history.rows().get(index) {
                state.refine_prompt = row.original.clone();
                state.page = ActivePage::Refine;
            }
            Effect::None
        }
    }
}

/// Runs a catalog-checked edit, then asks for a full snapshot write.
fn edit_selection<F>(state: &mut SessionState, slot: PromptSlot, edit: F) -> Effect
where
    F: FnOnce(&Catalog, &mut Selection) -> Result<(), RefinerError>,
{
    let result = match state.catalog.as_ref() {
        Some(catalog) => edit(catalog, &mut state.selection),
        None => Err(RefinerError::Offline),
    };
    match result {
        Ok(()) => {
            state.set_notice(slot, None);
            Effect::Persist {
                settings: state.selection.config.snapshot(),
                slot,
            }
        }
        Err(err) => {
            state.set_notice(slot, Some(err));
            Effect::None
        }
    }
}

fn start_flow(state: &mut SessionState, flow: Flow) -> Effect {
    if state.status(flow).busy {
        log::debug!("{flow:?} flow already in flight; trigger ignored");
        return Effect::None;
    }
    let config = &state.selection.config;
    let request = match flow {
        Flow::Single => RefineRequest::new(&state.refine_prompt, config).map(FlowRequest::Single),
        Flow::Chain => RefineRequest::new(&state.refine_prompt, config).map(FlowRequest::Chain),
        Flow::Agentic => {
            AgenticRequest::new(&state.agentic_prompt, config).map(FlowRequest::Agentic)
        }
    }
    .and_then(|request| {
        if state.catalog.is_some() {
            Ok(request)
        } else {
            Err(RefinerError::Offline)
        }
    });
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            state.status_mut(flow).error = Some(err);
            return Effect::None;
        }
    };
    let status = state.status_mut(flow);
    status.busy = true;
    status.error = None;
    // A new request discards the result it would replace.
    match flow.slot() {
        PromptSlot::Refine => state.last_result = None,
        PromptSlot::Agentic => state.last_agentic = None,
    }
    Effect::Request(request)
}

fn result_text(state: &SessionState, slot: PromptSlot) -> Option<String> {
    let text = match slot {
        PromptSlot::Refine => state
            .last_result
            .as_ref()
            .map(|r| r.result.refined_prompt.clone()),
        PromptSlot::Agentic => state.last_agentic.as_ref().map(|a| a.final_prompt.clone()),
    };
    text.filter(|t| !t.is_empty())
}

/// A failed capture, inject or copy replaces any earlier success feedback.
fn transfer_failed(state: &mut SessionState, slot: PromptSlot, err: RefinerError) {
    state.feedback = None;
    state.set_notice(slot, Some(err));
}

pub fn apply(state: &mut SessionState, outcome: Outcome) {
    match outcome {
        Outcome::Persisted { result: Ok(()), .. } => {}
        Outcome::Persisted {
            slot,
            result: Err(err),
        } => {
            log::warn!("failed to persist settings: {err}");
            state.set_notice(slot, Some(err));
        }
        Outcome::Flow {
            flow,
            prompt,
            result,
        } => {
            state.status_mut(flow).busy = false;
            match result {
                Ok(FlowResponse::Single(result)) => {
                    state.last_result = Some(DisplayResult::new(Flow::Single, &prompt, result));
                }
                Ok(FlowResponse::Chain(chain)) => {
                    state.last_result =
                        Some(DisplayResult::new(Flow::Chain, &prompt, chain.effective()));
                }
                Ok(FlowResponse::Agentic(result)) => {
                    state.last_agentic = Some(AgenticView::new(result));
                }
                Err(err) => {
                    log::debug!("{flow:?} flow failed: {err}");
                    state.status_mut(flow).error = Some(err);
                }
            }
        }
        Outcome::Captured { slot, result } => match result {
            Ok(text) => {
                *state.prompt_mut(slot) = text;
                state.feedback = Some(Feedback::Captured(slot));
            }
            Err(err) => transfer_failed(state, slot, err),
        },
        Outcome::Injected { slot, result } => match result {
            Ok(()) => state.feedback = Some(Feedback::Replaced(slot)),
            Err(err) => transfer_failed(state, slot, err),
        },
        Outcome::Copied { slot, result } => match result {
            Ok(()) => state.feedback = Some(Feedback::Copied(slot)),
            Err(err) => transfer_failed(state, slot, err),
        },
        Outcome::History(Ok(entries)) => {
            state.history = HistoryView::from_entries(&entries);
        }
        Outcome::History(Err(err)) => {
            log::warn!("history fetch failed: {err}");
            state.history = HistoryView::Failed;
        }
    }
}
