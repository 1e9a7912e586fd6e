use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::relay::RelayRequest;

/// Anything that can go wrong between the widget and the relay. The widget
/// never shows these to the user; they only reach the log.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay response has no assistant reply")]
    MalformedResponse,
}

#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, payload: &RelayRequest) -> Result<Value, WidgetError>;
}

/// POSTs the payload as JSON to a relay URL. Non-2xx statuses are errors.
pub struct HttpRelay {
    http: HttpClient,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>) -> Result<Self, WidgetError> {
        // Slightly longer than the relay's own upstream deadline.
        let http = HttpClient::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn send(&self, payload: &RelayRequest) -> Result<Value, WidgetError> {
        let body = self.http
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(body)
    }
}
