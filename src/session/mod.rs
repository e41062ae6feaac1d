//! Refinement session: the state a user interacts with and the orchestration
//! of the three refine flows, capture, injection and history around it.
//!
//! Every user action is an [`Intent`]. [`reduce`] applies it to a
//! [`SessionState`] and returns the [`Effect`] to perform, the
//! [`Orchestrator`] performs it, and [`apply`] folds the resulting
//! [`Outcome`] back into the state.

mod display;
mod intent;
mod orchestrator;
mod reducer;
mod state;

#[cfg(test)]
mod tests;

pub use display::{
    AgenticView, DisplayResult, HistoryRow, HistoryView, StepView, HISTORY_EMPTY_MESSAGE,
    HISTORY_FAILED_MESSAGE, HISTORY_PREVIEW_CHARS, NO_CHANGELOG, STEP_PREVIEW_CHARS,
};
pub use intent::{Effect, FlowRequest, FlowResponse, Intent, Outcome};
pub use orchestrator::{Orchestrator, DEFAULT_HISTORY_LIMIT};
pub use reducer::{apply, reduce};
pub use state::{
    ActivePage, Feedback, Flow, FlowStatus, OutputTab, PromptSlot, SessionState,
};
