use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{HistoryResponse, ModelsResponse};
use super::{
    AgenticRequest, AgenticResult, ChainResult, HistoryEntry, RefineRequest, RefinementResult,
    RefinementService,
};
use crate::catalog::SettingsCatalog;
use crate::error::RefinerError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client for the refinement service.
#[derive(Debug, Clone)]
pub struct RefinerClient {
    base_url: String,
    timeout_seconds: Option<u64>,
    client: Client,
}

impl Default for RefinerClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, None)
    }
}

impl RefinerClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: Option<u64>) -> Self {
        Self::with_client(Client::new(), base_url, timeout_seconds)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout_seconds {
            Some(timeout) => request.timeout(Duration::from_secs(timeout)),
            None => request,
        }
    }

    fn log_request_payload<T: Serialize>(&self, label: &str, body: &T) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("{label}: {json}");
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, RefinerError> {
        let response = self.apply_timeout(request).send().await?;
        let response = ensure_success_response(response, context).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: &str,
    ) -> Result<T, RefinerError> {
        self.log_request_payload(context, body);
        let request = self.client.post(self.url(path)).json(body);
        self.get_json(request, context).await
    }
}

/// Maps a non-success response to `RequestFailed`, keeping the service's
/// `detail` message when the body carries one as a string.
async fn ensure_success_response(
    response: Response,
    context: &str,
) -> Result<Response, RefinerError> {
    log::debug!("{context} HTTP status: {}", response.status());
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("detail")?.as_str().map(str::to_string));
    Err(RefinerError::RequestFailed { status, detail })
}

#[async_trait]
impl RefinementService for RefinerClient {
    async fn settings(&self) -> Result<SettingsCatalog, RefinerError> {
        let request = self.client.get(self.url("/api/settings"));
        self.get_json(request, "settings").await
    }

    async fn models(&self) -> Result<Vec<String>, RefinerError> {
        let request = self.client.get(self.url("/api/models"));
        let response: ModelsResponse = self.get_json(request, "models").await?;
        Ok(response.models)
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefinementResult, RefinerError> {
        self.post_json("/api/refine", request, "refine").await
    }

    async fn refine_chain(&self, request: &RefineRequest) -> Result<ChainResult, RefinerError> {
        self.post_json("/api/refine/chain", request, "refine chain")
            .await
    }

    async fn refine_agentic(
        &self,
        request: &AgenticRequest,
    ) -> Result<AgenticResult, RefinerError> {
        self.post_json("/api/refine/agentic", request, "refine agentic")
            .await
    }

    async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, RefinerError> {
        let request = self
            .client
            .get(self.url("/api/history"))
            .query(&[("limit", limit)]);
        let response: HistoryResponse = self.get_json(request, "history").await?;
        Ok(response.history)
    }
}
