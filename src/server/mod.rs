//! HTTP server for the relay.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub, validates signatures, and routes them to
//!   the thread synchronizer
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 200, or 401
//!   on a bad signature)
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use crate::chat::ThreadClient;
use crate::sync::{InMemoryRegistry, ThreadRegistry};
use crate::webhooks::EventRouter;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<C, R = InMemoryRegistry> {
    inner: Arc<AppStateInner<C, R>>,
}

struct AppStateInner<C, R> {
    /// Webhook secret for HMAC-SHA256 signature verification. When absent,
    /// every delivery is rejected.
    webhook_secret: Option<Vec<u8>>,

    router: EventRouter<C, R>,
}

impl<C, R> Clone for AppState<C, R> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, R> AppState<C, R>
where
    C: ThreadClient,
    R: ThreadRegistry,
{
    pub fn new(webhook_secret: Option<Vec<u8>>, router: EventRouter<C, R>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
                router,
            }),
        }
    }

    /// Returns the webhook secret, if one is configured.
    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }

    pub fn router(&self) -> &EventRouter<C, R> {
        &self.inner.router
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C, R>(app_state: AppState<C, R>) -> axum::Router
where
    C: ThreadClient + 'static,
    R: ThreadRegistry + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<C, R>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
