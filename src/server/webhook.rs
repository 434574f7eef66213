//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, parses the event
//! and routes it to the thread synchronizer before acknowledging.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::chat::ThreadClient;
use crate::sync::ThreadRegistry;
use crate::webhooks::{RouteOutcome, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that end a webhook request early.
///
/// Everything past signature verification is acknowledged with 200, so the
/// only rejection is an authentication failure.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload (required)
///   - `X-GitHub-Event`: Event type (e.g., "pull_request")
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK `Webhook received`: the delivery was authenticated. This includes
///   deliveries that were ignored or whose synchronization failed.
/// - 401 Unauthorized `Invalid signature`: verification failed or no secret
///   is configured.
///
/// # Example
///
/// ```ignore
/// POST /webhook HTTP/1.1
/// X-GitHub-Event: pull_request
/// X-Hub-Signature-256: sha256=...
/// Content-Type: application/json
///
/// {"action": "opened", "pull_request": {...}, "repository": {...}}
///
/// HTTP/1.1 200 OK
///
/// Webhook received
/// ```
pub async fn webhook_handler<C, R>(
    State(app_state): State<AppState<C, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    C: ThreadClient,
    R: ThreadRegistry,
{
    // Verify the signature before looking at anything else in the request.
    let signature_header = header_str(&headers, HEADER_SIGNATURE);
    if !verify_signature(&body, signature_header, app_state.webhook_secret()) {
        warn!(
            has_signature = signature_header.is_some(),
            has_secret = app_state.webhook_secret().is_some(),
            "Rejected webhook with invalid signature"
        );
        return Err(WebhookError::InvalidSignature);
    }

    let Some(event_type) = header_str(&headers, HEADER_EVENT) else {
        debug!("Webhook without event type header");
        return Ok(acknowledged());
    };

    let event = match parse_webhook(event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(event_type = %event_type, "Ignoring unsupported event type");
            return Ok(acknowledged());
        }
        Err(e) => {
            warn!(event_type = %event_type, error = %e, "Failed to parse webhook payload");
            return Ok(acknowledged());
        }
    };

    match app_state.router().route(event).await {
        RouteOutcome::Synced(thread_id) => {
            info!(event_type = %event_type, thread_id = %thread_id, "Webhook processed");
        }
        RouteOutcome::Failed => {
            warn!(event_type = %event_type, "Webhook processing failed");
        }
        RouteOutcome::Ignored => {}
    }

    Ok(acknowledged())
}

fn acknowledged() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Webhook received")
}

/// Returns a header value if present and valid UTF-8.
fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
