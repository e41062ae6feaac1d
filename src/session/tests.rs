use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::*;
use crate::bridge::{
    serve_page, CaptureKind, ChannelPageBridge, ElementKind, MemoryClipboard, PageDocument,
    PageElement, PageEvent,
};
use crate::catalog::{AgentRole, Mode, Persona, Pipeline, Preset, SettingsCatalog, Toggle};
use crate::client::{
    AgentStep, AgenticRequest, AgenticResult, ChainResult, HistoryEntry, RefineRequest,
    RefinementResult, RefinementService,
};
use crate::error::{RefinerError, OFFLINE_MESSAGE};
use crate::selection::{Configuration, Selection};
use crate::store::{
    HandoffSlot, MemoryHandoffSlot, MemorySettingsStore, PersistedSettings, SettingsStore,
};

#[derive(Default)]
struct FakeService {
    offline: bool,
    history: Vec<HistoryEntry>,
    history_fails: bool,
    refine_fails: bool,
    refine_calls: AtomicUsize,
    history_calls: AtomicUsize,
    /// When set, `refine` and `history` both wait here before answering.
    rendezvous: Option<Barrier>,
}

impl FakeService {
    fn calls(&self) -> usize {
        self.refine_calls.load(Ordering::SeqCst)
    }

    fn unreachable() -> RefinerError {
        RefinerError::ServiceUnreachable("connection refused".into())
    }
}

fn settings() -> SettingsCatalog {
    let ids = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
    SettingsCatalog {
        modes: ids(&["professional", "concise"])
            .into_iter()
            .map(|id| Mode {
                name: id.clone(),
                id,
                description: String::new(),
            })
            .collect(),
        personas: ids(&["none", "engineer"])
            .into_iter()
            .map(|id| Persona {
                name: id.clone(),
                id,
                icon: String::new(),
                description: String::new(),
            })
            .collect(),
        toggles: ids(&["examples", "steps"])
            .into_iter()
            .map(|id| Toggle {
                name: id.clone(),
                id,
                description: String::new(),
            })
            .collect(),
        presets: vec![Preset {
            id: "tutor".into(),
            name: "Tutor".into(),
            description: String::new(),
            mode: "concise".into(),
            persona: "engineer".into(),
            toggles: vec!["steps".into()],
        }],
        pipelines: vec![Pipeline {
            id: "full_review".into(),
            name: "Full review".into(),
            description: String::new(),
            agents: vec![
                AgentRole {
                    role: "Critic".into(),
                    instruction: String::new(),
                },
                AgentRole {
                    role: "Editor".into(),
                    instruction: String::new(),
                },
            ],
        }],
    }
}

#[async_trait]
impl RefinementService for FakeService {
    async fn settings(&self) -> Result<SettingsCatalog, RefinerError> {
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(settings())
    }

    async fn models(&self) -> Result<Vec<String>, RefinerError> {
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(vec!["phi3".into(), "llama3:8b".into()])
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefinementResult, RefinerError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        if self.refine_fails {
            return Err(RefinerError::RequestFailed {
                status: 500,
                detail: None,
            });
        }
        Ok(RefinementResult {
            refined_prompt: format!("Refined: {}", request.prompt),
            changelog: "- tightened wording".into(),
            composed_system_prompt: Some(format!("mode={}", request.mode)),
            ..Default::default()
        })
    }

    async fn refine_chain(&self, request: &RefineRequest) -> Result<ChainResult, RefinerError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChainResult {
            pass_1: RefinementResult {
                refined_prompt: "first pass".into(),
                composed_system_prompt: Some("pass one system".into()),
                ..Default::default()
            },
            pass_2: Some(RefinementResult {
                refined_prompt: format!("audited {}", request.prompt),
                changelog: "- audited".into(),
                composed_system_prompt: Some("auditor system".into()),
                ..Default::default()
            }),
        })
    }

    async fn refine_agentic(
        &self,
        request: &AgenticRequest,
    ) -> Result<AgenticResult, RefinerError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        let step = |agent: &str, output: &str| AgentStep {
            agent: agent.into(),
            instruction: String::new(),
            input: String::new(),
            output: output.into(),
        };
        Ok(AgenticResult {
            final_prompt: "agentic final".into(),
            steps: vec![step("Critic", "too vague"), step("Editor", "agentic final")],
            pipeline_id: Some(request.pipeline_id.clone()),
            original_prompt: Some(request.prompt.clone()),
        })
    }

    async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, RefinerError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        if self.offline || self.history_fails {
            return Err(Self::unreachable());
        }
        Ok(self.history.iter().take(limit).cloned().collect())
    }
}

fn entry(original: &str) -> HistoryEntry {
    HistoryEntry {
        timestamp: 1_700_000_000.0,
        kind: "single".into(),
        mode: Some("concise".into()),
        pipeline: None,
        original: original.into(),
        refined: Some("refined".into()),
        model: Some("phi3".into()),
    }
}

/// Loads defaults but refuses every write.
struct FailingStore;

impl SettingsStore for FailingStore {
    fn load(&self) -> Result<PersistedSettings, RefinerError> {
        Ok(PersistedSettings::default())
    }

    fn save(&self, _settings: &PersistedSettings) -> Result<(), RefinerError> {
        Err(RefinerError::Storage("disk full".into()))
    }
}

struct Harness {
    service: Arc<FakeService>,
    store: Arc<MemorySettingsStore>,
    orchestrator: Orchestrator,
}

fn harness(service: FakeService, persisted: PersistedSettings) -> Harness {
    let service = Arc::new(service);
    let store = Arc::new(MemorySettingsStore::new(persisted));
    let orchestrator = Orchestrator::new(service.clone(), store.clone());
    Harness {
        service,
        store,
        orchestrator,
    }
}

#[tokio::test]
async fn start_reconciles_settings_and_loads_history() {
    let persisted = PersistedSettings {
        mode: Some("concise".into()),
        toggles: Some(vec!["steps".into(), "retired".into()]),
        model: Some("gone".into()),
        ..Default::default()
    };
    let service = FakeService {
        history: vec![entry("first"), entry("second")],
        ..Default::default()
    };
    let h = harness(service, persisted);
    let state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;

    assert!(state.is_online());
    assert_eq!(state.startup_error, None);
    assert_eq!(state.selection.config.mode, "concise");
    assert_eq!(state.selection.config.toggle_list(), vec!["steps".to_string()]);
    assert_eq!(state.selection.config.model.as_deref(), Some("llama3:8b"));
    let originals: Vec<_> = state.history.rows().iter().map(|r| r.original.as_str()).collect();
    assert_eq!(originals, vec!["first", "second"]);
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn offline_start_shows_persisted_values_inertly() {
    let persisted = PersistedSettings {
        mode: Some("concise".into()),
        temperature: Some(1.1),
        ..Default::default()
    };
    let h = harness(
        FakeService {
            offline: true,
            ..Default::default()
        },
        persisted,
    );
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;

    assert!(!state.is_online());
    assert_eq!(state.startup_error.as_deref(), Some(OFFLINE_MESSAGE));
    assert_eq!(state.selection.config.mode, "concise");
    assert_eq!(state.selection.config.temperature, 1.1);
    assert_eq!(state.history, HistoryView::Failed);

    h.orchestrator
        .dispatch(&mut state, Intent::SelectMode("professional".into()))
        .await;
    assert_eq!(state.selection.config.mode, "concise");
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn handoff_is_drained_exactly_once() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let handoff = MemoryHandoffSlot::default();
    handoff.offer("  selected page text \n").unwrap();

    let state = h.orchestrator.start(&handoff).await;
    assert_eq!(state.refine_prompt, "selected page text");
    assert_eq!(handoff.drain().unwrap(), None);

    let again = h.orchestrator.start(&handoff).await;
    assert_eq!(again.refine_prompt, "");
}

#[tokio::test]
async fn blank_prompt_never_reaches_service() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.refine_prompt = " \n\t".into();
    state.agentic_prompt = String::new();

    for flow in [Flow::Single, Flow::Chain, Flow::Agentic] {
        h.orchestrator.dispatch(&mut state, Intent::RunFlow(flow)).await;
        assert_eq!(state.status(flow).error, Some(RefinerError::EmptyPrompt));
        assert_eq!(
            state.status(flow).error.as_ref().unwrap().to_string(),
            "Enter a prompt."
        );
    }
    assert_eq!(h.service.calls(), 0);
}

#[tokio::test]
async fn chain_shows_second_pass_with_first_pass_system_prompt() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.refine_prompt = "make it clear".into();

    h.orchestrator
        .dispatch(&mut state, Intent::RunFlow(Flow::Chain))
        .await;

    let display = state.last_result.as_ref().unwrap();
    assert_eq!(display.flow, Flow::Chain);
    assert_eq!(display.refined_text(), "audited make it clear");
    assert_eq!(display.changelog_text(), "- audited");
    assert_eq!(display.system_text(), "pass one system");
    assert!(!state.chain.busy);
}

#[tokio::test]
async fn agentic_steps_render_in_response_order() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.agentic_prompt = "  write a haiku  ".into();

    h.orchestrator
        .dispatch(&mut state, Intent::RunFlow(Flow::Agentic))
        .await;

    let view = state.last_agentic.as_ref().unwrap();
    let headings: Vec<_> = view.steps.iter().map(StepView::heading).collect();
    assert_eq!(headings, vec!["Step 1: Critic", "Step 2: Editor"]);
    assert_eq!(view.final_prompt, "agentic final");
    assert!(state.last_result.is_none());
}

#[tokio::test]
async fn busy_flow_is_locked_until_completion() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.refine_prompt = "once".into();

    let first = reduce(&mut state, Intent::RunFlow(Flow::Single));
    assert!(state.single.busy);
    assert_eq!(reduce(&mut state, Intent::RunFlow(Flow::Single)), Effect::None);

    let outcome = h.orchestrator.perform(first).await.unwrap();
    apply(&mut state, outcome);
    assert!(!state.single.busy);
    assert_eq!(h.service.calls(), 1);
}

#[tokio::test]
async fn refine_and_history_fetch_run_concurrently() {
    let h = harness(
        FakeService {
            rendezvous: Some(Barrier::new(2)),
            ..Default::default()
        },
        PersistedSettings::default(),
    );
    // Starting would block on the barrier, so assemble the session by hand.
    let catalog = h.service.load_catalog().await.unwrap();
    let mut state = SessionState {
        selection: Selection::new(Configuration::initialize(
            &PersistedSettings::default(),
            &catalog,
        )),
        catalog: Some(catalog),
        refine_prompt: "in parallel".into(),
        ..Default::default()
    };

    let refine = reduce(&mut state, Intent::RunFlow(Flow::Single));
    let history = reduce(&mut state, Intent::ShowPage(ActivePage::History));
    let both = async {
        tokio::join!(h.orchestrator.perform(refine), h.orchestrator.perform(history))
    };
    let (refined, fetched) = tokio::time::timeout(Duration::from_secs(5), both)
        .await
        .expect("both effects must be in flight together");

    apply(&mut state, fetched.unwrap());
    assert!(state.single.busy);
    assert_eq!(state.history, HistoryView::Empty);
    apply(&mut state, refined.unwrap());
    assert!(!state.single.busy);
    assert_eq!(
        state.last_result.as_ref().unwrap().refined_text(),
        "Refined: in parallel"
    );
}

#[tokio::test]
async fn failed_flow_does_not_disturb_others() {
    let h = harness(
        FakeService {
            refine_fails: true,
            ..Default::default()
        },
        PersistedSettings::default(),
    );
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.refine_prompt = "fails".into();
    state.agentic_prompt = "works".into();

    h.orchestrator
        .dispatch(&mut state, Intent::RunFlow(Flow::Single))
        .await;
    h.orchestrator
        .dispatch(&mut state, Intent::RunFlow(Flow::Agentic))
        .await;

    assert_eq!(
        state.single.error.as_ref().map(ToString::to_string).as_deref(),
        Some("Error 500")
    );
    assert_eq!(state.agentic.error, None);
    assert!(state.last_agentic.is_some());
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn preset_persists_one_full_snapshot() {
    let h = harness(FakeService::default(), PersistedSettings::default());
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;

    h.orchestrator
        .dispatch(&mut state, Intent::ApplyPreset("tutor".into()))
        .await;

    assert_eq!(h.store.writes(), 1);
    let stored = h.store.snapshot();
    assert_eq!(stored.mode.as_deref(), Some("concise"));
    assert_eq!(stored.persona.as_deref(), Some("engineer"));
    assert_eq!(stored.toggles, Some(vec!["steps".to_string()]));
    assert_eq!(stored.model.as_deref(), Some("llama3:8b"));
    assert_eq!(stored.pipeline.as_deref(), Some("full_review"));
    assert_eq!(state.selection.active_preset.as_deref(), Some("tutor"));

    h.orchestrator
        .dispatch(&mut state, Intent::SetTemperature(0.3))
        .await;
    assert_eq!(h.store.writes(), 2);
    assert_eq!(h.store.snapshot().temperature, Some(0.3));
    assert_eq!(h.store.snapshot().mode.as_deref(), Some("concise"));
}

#[tokio::test]
async fn history_page_distinguishes_empty_from_failed() {
    let empty = harness(FakeService::default(), PersistedSettings::default());
    let mut state = empty.orchestrator.start(&MemoryHandoffSlot::default()).await;
    empty
        .orchestrator
        .dispatch(&mut state, Intent::ShowPage(ActivePage::History))
        .await;
    assert_eq!(state.history.message(), Some(HISTORY_EMPTY_MESSAGE));

    let failing = harness(
        FakeService {
            history_fails: true,
            ..Default::default()
        },
        PersistedSettings::default(),
    );
    let mut state = failing.orchestrator.start(&MemoryHandoffSlot::default()).await;
    failing
        .orchestrator
        .dispatch(&mut state, Intent::ShowPage(ActivePage::History))
        .await;
    assert_eq!(state.history.message(), Some(HISTORY_FAILED_MESSAGE));
}

#[tokio::test]
async fn capture_refine_and_replace_through_page_bridge() {
    let (bridge, receiver) = ChannelPageBridge::channel(4);
    let page = PageDocument {
        elements: vec![
            PageElement::new(ElementKind::Other, "heading"),
            PageElement::new(ElementKind::TextArea, "draft from the page"),
        ],
        ..Default::default()
    };
    let served = tokio::spawn(serve_page(receiver, page));

    let clipboard = Arc::new(MemoryClipboard::default());
    let service = Arc::new(FakeService::default());
    let store = Arc::new(MemorySettingsStore::default());
    let orchestrator = Orchestrator::new(service, store)
        .with_page(Arc::new(bridge))
        .with_clipboard(clipboard.clone());
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::ActiveField,
                slot: PromptSlot::Refine,
            },
        )
        .await;
    assert_eq!(state.refine_prompt, "draft from the page");
    assert_eq!(state.feedback, Some(Feedback::Captured(PromptSlot::Refine)));

    orchestrator
        .dispatch(&mut state, Intent::RunFlow(Flow::Single))
        .await;
    orchestrator
        .dispatch(&mut state, Intent::InjectFrom(PromptSlot::Refine))
        .await;
    assert_eq!(state.feedback, Some(Feedback::Replaced(PromptSlot::Refine)));

    orchestrator
        .dispatch(&mut state, Intent::SelectOutputTab(OutputTab::Changelog))
        .await;
    orchestrator
        .dispatch(&mut state, Intent::CopyOutput(PromptSlot::Refine))
        .await;
    assert_eq!(clipboard.contents(), "- tightened wording");

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::PageSelection,
                slot: PromptSlot::Agentic,
            },
        )
        .await;
    assert_eq!(state.agentic_notice, Some(RefinerError::NoTextFound));

    drop(orchestrator);
    let page = served.await.unwrap();
    assert_eq!(page.elements[1].text, "Refined: draft from the page");
    assert_eq!(
        page.events,
        vec![PageEvent::Input {
            element: 1,
            bubbles: true
        }]
    );
}

#[tokio::test]
async fn privileged_page_and_empty_clipboard_report_inline() {
    let (bridge, receiver) = ChannelPageBridge::channel(1);
    tokio::spawn(serve_page(
        receiver,
        PageDocument {
            privileged: true,
            ..Default::default()
        },
    ));
    let orchestrator = Orchestrator::new(
        Arc::new(FakeService::default()),
        Arc::new(MemorySettingsStore::default()),
    )
    .with_page(Arc::new(bridge));
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::ActiveField,
                slot: PromptSlot::Refine,
            },
        )
        .await;
    assert_eq!(state.refine_notice, Some(RefinerError::PageAccessDenied));

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::Clipboard,
                slot: PromptSlot::Refine,
            },
        )
        .await;
    assert_eq!(
        state.refine_notice.as_ref().map(ToString::to_string).as_deref(),
        Some("Clipboard empty.")
    );
    assert_eq!(state.refine_prompt, "");
}

#[tokio::test]
async fn recall_moves_history_prompt_to_refine_page() {
    let h = harness(
        FakeService {
            history: vec![entry("older prompt")],
            ..Default::default()
        },
        PersistedSettings::default(),
    );
    let mut state = h.orchestrator.start(&MemoryHandoffSlot::default()).await;
    h.orchestrator
        .dispatch(&mut state, Intent::ShowPage(ActivePage::History))
        .await;
    h.orchestrator
        .dispatch(&mut state, Intent::RecallHistory(0))
        .await;
    assert_eq!(state.page, ActivePage::Refine);
    assert_eq!(state.refine_prompt, "older prompt");
}

#[tokio::test]
async fn start_can_skip_the_history_fetch() {
    let service = Arc::new(FakeService {
        history: vec![entry("kept for later")],
        ..Default::default()
    });
    let store = Arc::new(MemorySettingsStore::default());
    let orchestrator = Orchestrator::new(service.clone(), store).with_startup_history(false);
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;

    assert!(state.is_online());
    assert_eq!(state.history, HistoryView::NotLoaded);
    assert_eq!(service.history_calls.load(Ordering::SeqCst), 0);

    orchestrator
        .dispatch(&mut state, Intent::ShowPage(ActivePage::History))
        .await;
    assert_eq!(service.history_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.history.rows().len(), 1);
}

#[tokio::test]
async fn persist_failure_is_reported_on_the_editing_panel() {
    let orchestrator =
        Orchestrator::new(Arc::new(FakeService::default()), Arc::new(FailingStore));
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;

    orchestrator
        .dispatch(&mut state, Intent::SelectPipeline("full_review".into()))
        .await;
    assert_eq!(
        state.agentic_notice.as_ref().map(ToString::to_string).as_deref(),
        Some("Storage error: disk full")
    );
    assert_eq!(state.refine_notice, None);

    orchestrator
        .dispatch(&mut state, Intent::SelectMode("concise".into()))
        .await;
    assert_eq!(
        state.refine_notice,
        Some(RefinerError::Storage("disk full".into()))
    );
}

#[tokio::test]
async fn failed_capture_clears_earlier_success_feedback() {
    let orchestrator = Orchestrator::new(
        Arc::new(FakeService::default()),
        Arc::new(MemorySettingsStore::default()),
    )
    .with_clipboard(Arc::new(MemoryClipboard::with_text("hello")));
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::Clipboard,
                slot: PromptSlot::Refine,
            },
        )
        .await;
    assert_eq!(state.refine_prompt, "hello");
    assert_eq!(state.feedback, Some(Feedback::Captured(PromptSlot::Refine)));

    orchestrator
        .dispatch(
            &mut state,
            Intent::CaptureInto {
                kind: CaptureKind::PageSelection,
                slot: PromptSlot::Refine,
            },
        )
        .await;
    assert_eq!(state.feedback, None);
    assert_eq!(state.refine_notice, Some(RefinerError::PageAccessDenied));
    assert_eq!(state.refine_prompt, "hello");
}

#[tokio::test]
async fn replace_with_no_result_leaves_no_stale_feedback() {
    let orchestrator = Orchestrator::new(
        Arc::new(FakeService::default()),
        Arc::new(MemorySettingsStore::default()),
    )
    .with_clipboard(Arc::new(MemoryClipboard::with_text("hello")));
    let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;
    state.feedback = Some(Feedback::Copied(PromptSlot::Refine));

    orchestrator
        .dispatch(&mut state, Intent::InjectFrom(PromptSlot::Refine))
        .await;
    assert_eq!(state.feedback, None);
    assert_eq!(state.refine_notice, None);
}
