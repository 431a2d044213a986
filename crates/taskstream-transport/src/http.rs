use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use taskstream_protocol::extract_error_message;

use crate::decode::Utf8ChunkDecoder;
use crate::error::TransportError;
use crate::transport::{StreamRequest, Transport, TransportEvent};

/// Streaming transport over a plain chunked HTTP response.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(
        &self,
        req: &StreamRequest,
        tx: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) -> Result<(), TransportError> {
        let mut builder = self
            .client
            .post(&req.endpoint)
            .header("content-type", "application/json")
            .json(&req.body);
        if let Some(credential) = &req.credential {
            let (name, value) = credential.header();
            builder = builder.header(name, value);
        }

        debug!(endpoint = %req.endpoint, "opening stream");

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            resp = builder.send() => resp.map_err(classify)?,
        };

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            // Failure bodies are small JSON documents; read them whole.
            let text = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                text = resp.text() => text.unwrap_or_default(),
            };
            warn!(status, body = %text, "stream request rejected");
            return Err(TransportError::Api {
                status,
                message: extract_error_message(&text),
            });
        }

        let mut decoder = Utf8ChunkDecoder::new();
        let mut byte_stream = resp.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                next = byte_stream.next() => next,
            };
            match next {
                Some(Ok(bytes)) => {
                    let text = decoder.decode(&bytes);
                    if !text.is_empty() {
                        emit(&tx, &cancel, TransportEvent::Chunk { text }).await?;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "stream interrupted");
                    return Err(TransportError::Http(e));
                }
                None => break,
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            emit(&tx, &cancel, TransportEvent::Chunk { text: tail }).await?;
        }
        emit(&tx, &cancel, TransportEvent::Done).await?;
        debug!(endpoint = %req.endpoint, "stream finished");
        Ok(())
    }
}

/// Send one event, giving up as soon as the stream is cancelled or the
/// receiving side is gone.
async fn emit(
    tx: &mpsc::Sender<TransportEvent>,
    cancel: &CancellationToken,
    event: TransportEvent,
) -> Result<(), TransportError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Cancelled),
        sent = tx.send(event) => sent.map_err(|_| TransportError::Cancelled),
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Http(e)
    }
}
