//! Transport seam: how the session reaches the completion endpoint.
//! The session is written against the trait so tests can script the wire
//! without a server.

use crate::history::Message;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned status {status}")]
    Status { status: u16 },
    #[error("stream read failed: {reason}")]
    Read { reason: String },
}

pub type ChunkStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Opens one streaming completion exchange per accepted send.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn open(&self, messages: &[Message]) -> Result<ChunkStream, TransportError>;
}

/// Request body: the full ordered history as `{role, content}` pairs, no
/// other fields.
#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [Message],
}

/// `reqwest`-backed transport POSTing to a fixed chat-completion endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> Result<Self, TransportError> {
        // Connect timeout only: the body is an open-ended stream.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn open(&self, messages: &[Message]) -> Result<ChunkStream, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&CompletionRequest { messages })
            .send()
            .await?;

        // Any non-success status is treated uniformly; no per-code branching.
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from))
            .boxed())
    }
}
