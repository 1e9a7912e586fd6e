use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use std::time::Duration;
use thiserror::Error;

use crate::llm::chat::UpstreamError;
use crate::models::relay::ErrorEnvelope;

const CONFIGURATION_MESSAGE: &str = "Server configuration error. Please try again later.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("no upstream credential configured")]
    MissingCredential,
    #[error("upstream call exceeded {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to hand to the browser. Never carries upstream bodies,
    /// credentials, or whether a credential exists.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::MethodNotAllowed(_) => "Method not allowed. Use POST.".to_string(),
            RelayError::MalformedBody(_) =>
                "Invalid request body. Expected a JSON object with a messages array.".to_string(),
            RelayError::PayloadTooLarge(_) =>
                "Request body is too large. Send only the recent messages.".to_string(),
            RelayError::MissingCredential => CONFIGURATION_MESSAGE.to_string(),
            RelayError::Timeout(_) => "The request timed out. Please try again.".to_string(),
            RelayError::Upstream(e) =>
                match e {
                    UpstreamError::RateLimited =>
                        "Rate limit reached. Please wait a moment and try again.".to_string(),
                    UpstreamError::Status(code) => format!("Request failed with status {}", code),
                    UpstreamError::Network(_) | UpstreamError::InvalidBody(_) =>
                        "Failed to reach the assistant. Please try again later.".to_string(),
                    UpstreamError::Unauthorized
                    | UpstreamError::MissingApiKey
                    | UpstreamError::InvalidApiKey
                    | UpstreamError::Client(_) => CONFIGURATION_MESSAGE.to_string(),
                }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorEnvelope::new(self.public_message()))).into_response()
    }
}
