use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::PageBridge;
use crate::error::RefinerError;

/// One capability call sent to the page context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    GetSelection,
    GetActiveField,
    ReplaceActiveField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    Selection(String),
    ActiveField(Option<String>),
    Replaced(bool),
}

#[derive(Debug)]
pub struct PageCall {
    pub request: PageRequest,
    pub reply: oneshot::Sender<Result<PageResponse, RefinerError>>,
}

/// Page-side handler for [`PageRequest`]s.
pub trait PageScript: Send {
    fn handle(&mut self, request: PageRequest) -> Result<PageResponse, RefinerError>;
}

/// [`PageBridge`] that forwards every call over a channel to the page
/// context. A closed channel or dropped reply is treated as a refused page.
#[derive(Debug, Clone)]
pub struct ChannelPageBridge {
    sender: mpsc::Sender<PageCall>,
}

impl ChannelPageBridge {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<PageCall>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }

    async fn call(&self, request: PageRequest) -> Result<PageResponse, RefinerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PageCall { request, reply })
            .await
            .map_err(|_| RefinerError::PageAccessDenied)?;
        response.await.map_err(|_| RefinerError::PageAccessDenied)?
    }
}

fn unexpected(response: PageResponse) -> RefinerError {
    log::warn!("page answered with mismatched response: {response:?}");
    RefinerError::PageAccessDenied
}

#[async_trait]
impl PageBridge for ChannelPageBridge {
    async fn get_selection(&self) -> Result<String, RefinerError> {
        match self.call(PageRequest::GetSelection).await? {
            PageResponse::Selection(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    async fn get_active_field(&self) -> Result<Option<String>, RefinerError> {
        match self.call(PageRequest::GetActiveField).await? {
            PageResponse::ActiveField(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    async fn replace_active_field(&self, text: &str) -> Result<bool, RefinerError> {
        match self
            .call(PageRequest::ReplaceActiveField(text.to_string()))
            .await?
        {
            PageResponse::Replaced(done) => Ok(done),
            other => Err(unexpected(other)),
        }
    }
}

/// Answers calls until every bridge handle is dropped, then hands the script
/// back so its final state can be inspected or saved.
pub async fn serve_page<S: PageScript>(mut receiver: mpsc::Receiver<PageCall>, mut script: S) -> S {
    while let Some(call) = receiver.recv().await {
        let result = script.handle(call.request);
        if call.reply.send(result).is_err() {
            log::debug!("page call abandoned before reply");
        }
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl PageScript for Echo {
        fn handle(&mut self, request: PageRequest) -> Result<PageResponse, RefinerError> {
            match request {
                PageRequest::GetSelection => Ok(PageResponse::Replaced(true)),
                PageRequest::GetActiveField => Err(RefinerError::PageAccessDenied),
                PageRequest::ReplaceActiveField(_) => Ok(PageResponse::Replaced(true)),
            }
        }
    }

    #[tokio::test]
    async fn mismatched_response_is_refused() {
        let (bridge, receiver) = ChannelPageBridge::channel(1);
        tokio::spawn(serve_page(receiver, Echo));
        assert_eq!(
            bridge.get_selection().await,
            Err(RefinerError::PageAccessDenied)
        );
        assert_eq!(bridge.replace_active_field("x").await, Ok(true));
    }

    #[tokio::test]
    async fn closed_page_is_refused() {
        let (bridge, receiver) = ChannelPageBridge::channel(1);
        drop(receiver);
        assert_eq!(
            bridge.get_active_field().await,
            Err(RefinerError::PageAccessDenied)
        );
    }

    #[tokio::test]
    async fn serve_returns_script_when_bridges_drop() {
        let (bridge, receiver) = ChannelPageBridge::channel(1);
        let server = tokio::spawn(serve_page(receiver, Echo));
        bridge.replace_active_field("x").await.unwrap();
        drop(bridge);
        assert!(server.await.is_ok());
    }
}
