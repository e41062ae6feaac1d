use std::sync::Arc;

use crate::bridge::{capture, inject, ClipboardSource, DetachedPage, MemoryClipboard, PageBridge};
use crate::client::RefinementService;
use crate::error::OFFLINE_MESSAGE;
use crate::selection::{Configuration, Selection};
use crate::store::{HandoffSlot, SettingsStore};

use super::display::HistoryView;
use super::intent::{Effect, FlowRequest, FlowResponse, Intent, Outcome};
use super::reducer::{apply, reduce};
use super::state::SessionState;

/// Default number of history entries requested.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Performs the side effects the reducer asks for.
///
/// The orchestrator holds only collaborators; session state is owned by the
/// caller, so several effects may be awaited at once against the same
/// orchestrator while the state is updated as each one lands.
pub struct Orchestrator {
    service: Arc<dyn RefinementService>,
    page: Arc<dyn PageBridge>,
    clipboard: Arc<dyn ClipboardSource>,
    store: Arc<dyn SettingsStore>,
    history_limit: usize,
    startup_history: bool,
}

impl Orchestrator {
    /// Creates an orchestrator with no page attached and an in-process
    /// clipboard.
    pub fn new(service: Arc<dyn RefinementService>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            service,
            page: Arc::new(DetachedPage),
            clipboard: Arc::new(MemoryClipboard::default()),
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
            startup_history: true,
        }
    }

    pub fn with_page(mut self, page: Arc<dyn PageBridge>) -> Self {
        self.page = page;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSource>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Whether `start` fetches history. When off, history stays
    /// `NotLoaded` until the history page is shown.
    pub fn with_startup_history(mut self, enabled: bool) -> Self {
        self.startup_history = enabled;
        self
    }

    /// Builds the session: persisted settings reconciled with the catalog,
    /// the pending handoff drained into the refine prompt, and a first
    /// history fetch unless disabled with [`Self::with_startup_history`].
    ///
    /// An unreachable service leaves the catalog absent; the persisted
    /// values are still shown, but nothing can be changed or sent.
    pub async fn start(&self, handoff: &dyn HandoffSlot) -> SessionState {
        let persisted = self.store.load().unwrap_or_else(|err| {
            log::warn!("ignoring unreadable settings: {err}");
            Default::default()
        });

        let mut state = SessionState::default();
        match self.service.load_catalog().await {
            Ok(catalog) => {
                let config = Configuration::initialize(&persisted, &catalog);
                log::debug!(
                    "session started with mode={} persona={} model={:?}",
                    config.mode,
                    config.persona,
                    config.model
                );
                state.selection = Selection::new(config);
                state.catalog = Some(catalog);
            }
            Err(err) => {
                log::warn!("catalog load failed: {err}");
                state.selection = Selection::new(Configuration::from_persisted(&persisted));
                state.startup_error = Some(OFFLINE_MESSAGE.to_string());
            }
        }

        match handoff.drain() {
            Ok(Some(text)) => state.refine_prompt = text,
            Ok(None) => {}
            Err(err) => log::warn!("could not read pending handoff: {err}"),
        }

        if !self.startup_history {
            return state;
        }
        state.history = HistoryView::Loading;
        if let Some(outcome) = self.perform(Effect::FetchHistory).await {
            apply(&mut state, outcome);
        }
        state
    }

    /// Reduces the intent, performs its effect and applies the outcome.
    pub async fn dispatch(&self, state: &mut SessionState, intent: Intent) {
        let effect = reduce(state, intent);
        if let Some(outcome) = self.perform(effect).await {
            apply(state, outcome);
        }
    }

    /// Runs one effect to completion. Each effect is a single attempt;
    /// failures come back inside the outcome.
    pub async fn perform(&self, effect: Effect) -> Option<Outcome> {
        let outcome = match effect {
            Effect::None => return None,
            Effect::Persist { settings, slot } => Outcome::Persisted {
                slot,
                result: self.store.save(&settings),
            },
            Effect::Request(request) => {
                let flow = request.flow();
                let prompt = request.prompt().to_string();
                let result = match &request {
                    FlowRequest::Single(req) => {
                        self.service.refine(req).await.map(FlowResponse::Single)
                    }
                    FlowRequest::Chain(req) => {
                        self.service.refine_chain(req).await.map(FlowResponse::Chain)
                    }
                    FlowRequest::Agentic(req) => self
                        .service
                        .refine_agentic(req)
                        .await
                        .map(FlowResponse::Agentic),
                };
                Outcome::Flow {
                    flow,
                    prompt,
                    result,
                }
            }
            Effect::Capture { kind, slot } => Outcome::Captured {
                slot,
                result: capture(kind, self.page.as_ref(), self.clipboard.as_ref()).await,
            },
            Effect::Inject { text, slot } => Outcome::Injected {
                slot,
                result: inject(self.page.as_ref(), &text).await,
            },
            Effect::Copy { text, slot } => Outcome::Copied {
                slot,
                result: self.clipboard.write_text(&text).await,
            },
            Effect::FetchHistory => {
                Outcome::History(self.service.history(self.history_limit).await)
            }
        };
        Some(outcome)
    }
}
