use crate::errors::{ApiError, StreamError, TeachAssistError};
use crate::notify::Notifier;
use crate::streaming::{self, CancelToken, Completion};
use crate::telemetry::redact_secrets;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod types;

use types::*;

/// Raw body chunks of a streamed response, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Vec<u8>, ApiError>> + Send>>;

/// Trait abstraction over the function transport, enabling test mocking.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Post a generation request and return its body once the function has
    /// answered with a success status. Non-2xx answers become [`ApiError`]s.
    async fn open_stream(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<ByteStream, ApiError>;
}

/// HTTP client for the portal's generation functions.
pub struct AssistantClient {
    client: Client,
    config: crate::config::Config,
}

impl std::fmt::Debug for AssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantClient")
            .field("functions_url", &self.config.functions_url)
            .field("has_key", &self.config.api_key.is_some())
            .finish()
    }
}

impl AssistantClient {
    pub fn new(config: &crate::config::Config) -> Result<Self> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(config.http.connect_timeout_secs));
        // Streams run for as long as the model writes unless a limit is set
        if let Some(secs) = config.http.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl GenerationBackend for AssistantClient {
    async fn open_stream(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<ByteStream, ApiError> {
        let url = self.config.endpoint(request.endpoint());
        debug!("Starting streaming request to {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request.body());
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key).header("apikey", key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                "{} returned {}: {}",
                request.endpoint(),
                status.as_u16(),
                redact_secrets(&text)
            );
            return Err(ApiError::from_status(
                status.as_u16(),
                ErrorBody::message_from(&text),
                request.status_mapping(),
            ));
        }

        if response.content_length() == Some(0) {
            return Err(ApiError::MissingBody);
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(ApiError::from));
        Ok(Box::pin(body))
    }
}

/// Runs generations end to end: validation, request, streaming and user
/// notification.
pub struct Generator<B: GenerationBackend> {
    backend: B,
    notifier: Arc<dyn Notifier>,
}

impl<B: GenerationBackend> Generator<B> {
    pub fn new(backend: B, notifier: Arc<dyn Notifier>) -> Self {
        Self { backend, notifier }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate content for `request`, publishing the growing text to
    /// `on_progress` after every delta.
    ///
    /// Failures are reported to the notifier before being returned.
    /// Cancellation is returned without a notification.
    pub async fn generate<F>(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
        on_progress: F,
    ) -> crate::errors::Result<Completion>
    where
        F: FnMut(&str),
    {
        let label = request.label();
        match self.run(request, cancel, on_progress).await {
            Ok(completion) => {
                info!("{} generated ({})", label, completion.stats);
                self.notifier
                    .success("Generated", &format!("Your {} is ready.", label));
                Ok(completion)
            }
            Err(TeachAssistError::Stream(StreamError::Cancelled)) => {
                debug!("{} cancelled", label);
                Err(StreamError::Cancelled.into())
            }
            Err(e) => {
                warn!("{} failed: {}", label, e);
                self.notifier.error("Error", &e.user_message());
                Err(e)
            }
        }
    }

    async fn run<F>(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
        on_progress: F,
    ) -> crate::errors::Result<Completion>
    where
        F: FnMut(&str),
    {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(StreamError::Cancelled.into());
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled.into()),
            opened = self.backend.open_stream(request) => opened?,
        };

        Ok(streaming::consume(body, cancel, on_progress).await?)
    }
}
