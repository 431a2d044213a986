use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskstream_core::Credential;

use crate::error::TransportError;

/// Events delivered while a stream is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Decoded text, in arrival order. Never splits a UTF-8 sequence.
    Chunk { text: String },
    /// The response body ended normally.
    Done,
}

/// One streaming POST: where it goes, on whose behalf, with what body.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub endpoint: String,
    pub credential: Option<Credential>,
    pub body: Value,
}

impl StreamRequest {
    pub fn new(endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: None,
            body,
        }
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }
}

/// Anything that can open a streaming request and feed its body into a channel.
///
/// `open` resolves when the stream is over:
/// - `Ok(())` after the body ended (a `Done` event has been sent),
/// - `Err(Cancelled)` once `cancel` fired; the connection is released and no
///   further events are sent,
/// - any other `Err` when the request could not be opened, the backend
///   answered with a non-success status, or the body broke off mid-way.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    async fn open(
        &self,
        req: &StreamRequest,
        tx: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) -> Result<(), TransportError>;
}
