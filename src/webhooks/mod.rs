//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Typed event parsing
//! - Routing of parsed events to the thread synchronizer

pub mod events;
pub mod parser;
pub mod router;
pub mod signature;

pub use events::{GitHubEvent, PrAction};
pub use parser::{ParseError, parse_webhook};
pub use router::{Dispatch, EventRouter, RouteOutcome, classify};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
