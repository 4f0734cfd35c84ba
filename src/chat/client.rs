use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{with_system_prompt, ChatError, ChatMessage, CompletionRequest};
use crate::config::ChatConfig;

/// Streaming client for the chat gateway. Cheap to clone.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<ChatClientInner>,
}

struct ChatClientInner {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().connect_timeout(Duration::from_secs(10)).build()?;
        Ok(Self { inner: Arc::new(ChatClientInner { http, config }) })
    }

    /// Forward a conversation and return the gateway's event stream.
    ///
    /// # Errors
    ///
    /// Returns `ChatError` when no key is configured, the request fails, or the
    /// gateway answers with a non-success status.
    #[instrument(skip(self, messages), fields(model = %self.inner.config.model, messages = messages.len()))]
    pub async fn stream(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, ChatError> {
        let api_key = self.inner.config.api_key.as_ref().ok_or(ChatError::MissingApiKey)?;
        let request = CompletionRequest {
            model: &self.inner.config.model,
            messages: with_system_prompt(messages),
            stream: true,
        };

        let response = self
            .inner
            .http
            .post(&self.inner.config.gateway_url)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.bytes_stream()),
            StatusCode::TOO_MANY_REQUESTS => Err(ChatError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => Err(ChatError::PaymentRequired),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ChatError::Upstream { status, body })
            }
        }
    }
}
