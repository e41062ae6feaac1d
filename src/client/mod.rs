//! Contract with the local refinement service.

mod http;
mod types;

use async_trait::async_trait;

use crate::catalog::{Catalog, SettingsCatalog};
use crate::error::RefinerError;

pub use http::{RefinerClient, DEFAULT_BASE_URL};
pub use types::{
    AgentStep, AgenticRequest, AgenticResult, ChainResult, HistoryEntry, RefineRequest,
    RefinementResult,
};

/// The service endpoints the orchestrator drives.
#[async_trait]
pub trait RefinementService: Send + Sync {
    async fn settings(&self) -> Result<SettingsCatalog, RefinerError>;

    async fn models(&self) -> Result<Vec<String>, RefinerError>;

    async fn refine(&self, request: &RefineRequest) -> Result<RefinementResult, RefinerError>;

    async fn refine_chain(&self, request: &RefineRequest) -> Result<ChainResult, RefinerError>;

    async fn refine_agentic(&self, request: &AgenticRequest)
        -> Result<AgenticResult, RefinerError>;

    async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, RefinerError>;

    /// Fetches settings and models concurrently; either failing fails the load.
    async fn load_catalog(&self) -> Result<Catalog, RefinerError> {
        let (settings, models) = tokio::try_join!(self.settings(), self.models())?;
        Ok(Catalog::new(settings, models))
    }
}
