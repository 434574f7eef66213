//! Chat-platform error types.
//!
//! None of these are retried: the relay treats every chat failure as terminal
//! for the current webhook delivery. The variants exist so that logs say
//! *why* a call failed.

use std::time::Duration;

use thiserror::Error;

/// A failed chat-platform call.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The platform answered with a non-success status.
    #[error("chat API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("chat transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call did not complete within the configured bound.
    #[error("chat call `{operation}` timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The platform answered, but not with the shape we expected.
    #[error("unexpected chat API response: {0}")]
    Decode(String),
}

impl ChatError {
    /// Returns the HTTP status code, if the platform returned one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::Http { status, .. } => Some(*status),
            ChatError::Transport(e) => e.status().map(|s| s.as_u16()),
            ChatError::Timeout { .. } | ChatError::Decode(_) => None,
        }
    }
}
