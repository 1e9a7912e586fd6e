use crate::relay::{ Relay, RelayError };
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    Json,
    extract::{ rejection::BytesRejection, DefaultBodyLimit, State },
    response::{ IntoResponse, Response },
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
            CACHE_CONTROL,
        },
        HeaderValue,
        Method,
        StatusCode,
    },
};
use tower_http::set_header::SetResponseHeaderLayer;
use log::{ info, warn, error };

pub const CHAT_ROUTE: &str = "/api/chat";

/// Largest request body the relay will buffer. Five chat messages fit easily.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    relay: Arc<Relay>,
}

/// Relay routes. Every response, including errors and the 405 fallback,
/// carries `Access-Control-Allow-Origin: *`.
pub fn router(relay: Arc<Relay>) -> Router {
    let app_state = AppState { relay };

    let chat = post(chat_handler).options(preflight_handler).fallback(method_not_allowed_handler);

    Router::new()
        .route(CHAT_ROUTE, chat)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*")
            )
        )
        .with_state(app_state)
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let e = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                RelayError::PayloadTooLarge(MAX_BODY_BYTES)
            } else {
                RelayError::MalformedBody(rejection.body_text())
            };
            warn!("Rejected chat request: {}", e);
            return e.into_response();
        }
    };

    match state.relay.handle(&body).await {
        Ok(upstream) => {
            info!("Chat request relayed");
            (StatusCode::OK, [(CACHE_CONTROL, "no-cache")], Json(upstream)).into_response()
        }
        Err(e) => {
            match &e {
                RelayError::MalformedBody(_)
                | RelayError::PayloadTooLarge(_)
                | RelayError::MethodNotAllowed(_) => {
                    warn!("Rejected chat request: {}", e)
                }
                RelayError::Upstream(_) | RelayError::Timeout(_) => {
                    error!("Chat relay failed: {}", e)
                }
                RelayError::MissingCredential => error!("Chat relay misconfigured: {}", e),
            }
            e.into_response()
        }
    }
}

async fn preflight_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

async fn method_not_allowed_handler(method: Method) -> Response {
    warn!("{} {} not allowed", method, CHAT_ROUTE);
    RelayError::MethodNotAllowed(method.to_string()).into_response()
}
