//! Qiita Webhook - GitHub Push Receiver
//!
//! Receives GitHub push webhooks and republishes added or modified Markdown
//! files as Qiita articles. Requests must carry a valid
//! `X-Hub-Signature-256` header; anything else is rejected before the
//! payload is even parsed.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | configured (`/payload`) | GitHub push or ping delivery |
//! | `GET`  | `/health` | Liveness check |
//!
//! Both GitHub content types are accepted: `application/json`, and
//! `application/x-www-form-urlencoded` with the JSON in a `payload` field.

pub mod config;
pub mod signature;

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use publish_common::{ArticleSync, PushEvent};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::signature::{SIGNATURE_HEADER, validate_signature};

/// Shared application state.
pub struct AppState {
    pub sync: ArticleSync,
    pub secret: String,
}

/// Reasons a delivery is not acknowledged with 200.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Signatures didn't match!")]
    SignatureMismatch,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Sync(#[from] publish_common::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::SignatureMismatch | WebhookError::Sync(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Form-encoded delivery body.
#[derive(Deserialize)]
struct FormDelivery {
    payload: String,
}

/// Parses a delivery body according to its content type.
pub fn decode_push(headers: &HeaderMap, body: &[u8]) -> Result<PushEvent, WebhookError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let event = if is_form {
        let form: FormDelivery = serde_urlencoded::from_bytes(body)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
        serde_json::from_str(&form.payload)
    } else {
        serde_json::from_slice(body)
    };

    event.map_err(|e| WebhookError::MalformedPayload(e.to_string()))
}

/// Handles a GitHub delivery.
async fn handle_push(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let delivery = headers
        .get("x-github-delivery")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    if !validate_signature(&state.secret, &body, signature) {
        warn!(%delivery, "rejected delivery with invalid signature");
        return Err(WebhookError::SignatureMismatch);
    }

    let event = decode_push(&headers, &body).inspect_err(|e| {
        warn!(%delivery, error = %e, "rejected undecodable delivery");
    })?;

    if event.is_ping() {
        info!(%delivery, zen = event.zen.as_deref().unwrap_or_default(), "GitHub webhook registered");
        return Ok(StatusCode::OK);
    }

    let report = state.sync.process_push(&event).await.inspect_err(|e| {
        error!(%delivery, error = %e, "push delivery aborted");
    })?;

    info!(
        %delivery,
        published = report.published.len(),
        skipped = report.skipped.len(),
        "processed push delivery"
    );
    Ok(StatusCode::OK)
}

/// Builds the router with the webhook mounted on `path`.
pub fn build_app(path: &str, state: Arc<AppState>) -> Router {
    Router::new()
        .route(path, post(handle_push))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}
