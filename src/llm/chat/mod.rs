pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::openai::OpenAIChatClient;
use crate::models::chat::ChatMessage;

/// Failures of a single upstream chat-completion call. These carry upstream
/// detail for logs; callers of the relay only ever see the normalized text.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no API key configured for the upstream provider")]
    MissingApiKey,
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upstream rate limit exceeded")]
    RateLimited,
    #[error("upstream rejected the credential")]
    Unauthorized,
    #[error("upstream responded with status {0}")]
    Status(u16),
    #[error("network error talking to upstream: {0}")]
    Network(#[source] reqwest::Error),
    #[error("upstream returned a body that is not JSON: {0}")]
    InvalidBody(#[source] reqwest::Error),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `messages` as one chat-completion call and returns the upstream
    /// JSON body untouched.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Value, UpstreamError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, UpstreamError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

/// `choices[0].message.content`, if the body has that shape.
pub fn first_choice_content(body: &Value) -> Option<&str> {
    body.get("choices")?.get(0)?.get("message")?.get("content")?.as_str()
}
