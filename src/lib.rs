//! Client core for a local prompt refinement service.
//!
//! The crate keeps the user's refinement configuration in sync with the
//! service catalog, drives the single, chain and agentic refine flows, and
//! moves text between the session and a page through a typed bridge.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prompt_refiner::client::RefinerClient;
//! use prompt_refiner::session::{Flow, Intent, Orchestrator};
//! use prompt_refiner::store::{MemoryHandoffSlot, MemorySettingsStore};
//!
//! # async fn demo() {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(RefinerClient::default()),
//!     Arc::new(MemorySettingsStore::default()),
//! );
//! let mut state = orchestrator.start(&MemoryHandoffSlot::default()).await;
//! state.refine_prompt = "write a cover letter".into();
//! orchestrator.dispatch(&mut state, Intent::RunFlow(Flow::Single)).await;
//! # }
//! ```

pub mod bridge;
pub mod catalog;
pub mod client;
pub mod error;
pub mod metrics;
pub mod selection;
pub mod session;
pub mod store;

pub use error::RefinerError;
