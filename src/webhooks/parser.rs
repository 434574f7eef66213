//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`GitHubEvent`] values.
//! The parser is designed to be robust against unknown fields and event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details
//!
//! Unknown *actions* on a known event type still parse; deciding whether to
//! act on them is the router's job.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrId, PrNumber, PrState, PullRequest, Review, ReviewState, User};

use super::events::{
    GitHubEvent, PrAction, PullRequestEvent, PullRequestReviewEvent, ReviewRequestEvent,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Arguments
///
/// * `event_type` - The value of the `X-GitHub-Event` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a known event type
/// * `Ok(None)` - Unknown event type (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use pr_thread_relay::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "action": "opened",
///     "pull_request": {
///         "id": 1001,
///         "number": 42,
///         "title": "Fix bug",
///         "body": null,
///         "html_url": "https://github.com/octocat/hello-world/pull/42",
///         "state": "open",
///         "merged": false,
///         "user": { "id": 1, "login": "octocat" }
///     },
///     "repository": { "full_name": "octocat/hello-world" }
/// }"#;
///
/// let event = parse_webhook("pull_request", payload).unwrap();
/// assert!(event.is_some());
/// assert!(parse_webhook("push", payload).unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(payload).map(|e| Some(GitHubEvent::PullRequest(e))),
        "pull_request_review" => {
            parse_pull_request_review(payload).map(|e| Some(GitHubEvent::PullRequestReview(e)))
        }
        "pull_request_review_request" => {
            parse_review_request(payload).map(|e| Some(GitHubEvent::ReviewRequest(e)))
        }
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Optional fields use Option<T>
// so that partial payloads (e.g. the PR object inside review events, which has
// no `merged` flag) still parse.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: u64,
    login: String,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User::new(raw.id, raw.login)
    }
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    id: u64,
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    state: String,
    user: RawUser,
    merged: Option<bool>,
    merged_by: Option<RawUser>,
    closed_by: Option<RawUser>,
}

fn convert_pull_request(raw: RawPullRequest) -> Result<PullRequest, ParseError> {
    let state = match raw.state.as_str() {
        "open" => PrState::Open,
        "closed" => PrState::Closed,
        other => {
            return Err(ParseError::InvalidField {
                field: "pull_request.state",
                value: other.to_string(),
            });
        }
    };

    Ok(PullRequest {
        id: PrId(raw.id),
        number: PrNumber(raw.number),
        title: raw.title,
        body: raw.body,
        html_url: raw.html_url,
        state,
        merged: raw.merged.unwrap_or(false),
        author: raw.user.into(),
        merged_by: raw.merged_by.map(User::from),
        closed_by: raw.closed_by.map(User::from),
        requested_reviewer: None,
        review: None,
    })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: Option<RawRepository>,
}

fn parse_pull_request(payload: &[u8]) -> Result<PullRequestEvent, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    Ok(PullRequestEvent {
        action: PrAction::parse(&raw.action),
        pull_request: convert_pull_request(raw.pull_request)?,
        repository: raw.repository.map(|r| r.full_name),
    })
}

// ============================================================================
// pull_request_review event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestReviewPayload {
    action: String,
    review: RawReview,
    pull_request: RawPullRequest,
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    id: u64,
    user: RawUser,
    body: Option<String>,
    state: String,
    submitted_at: Option<DateTime<Utc>>,
}

fn parse_pull_request_review(payload: &[u8]) -> Result<PullRequestReviewEvent, ParseError> {
    let raw: RawPullRequestReviewPayload = serde_json::from_slice(payload)?;

    let review = Review {
        id: raw.review.id,
        author: raw.review.user.into(),
        body: raw.review.body,
        state: ReviewState::parse(&raw.review.state),
        submitted_at: raw.review.submitted_at,
    };

    Ok(PullRequestReviewEvent {
        action: raw.action,
        pull_request: convert_pull_request(raw.pull_request)?,
        review,
        repository: raw.repository.map(|r| r.full_name),
    })
}

// ============================================================================
// pull_request_review_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReviewRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    requested_reviewer: Option<RawUser>,
    repository: Option<RawRepository>,
}

fn parse_review_request(payload: &[u8]) -> Result<ReviewRequestEvent, ParseError> {
    let raw: RawReviewRequestPayload = serde_json::from_slice(payload)?;

    Ok(ReviewRequestEvent {
        action: raw.action,
        pull_request: convert_pull_request(raw.pull_request)?,
        requested_reviewer: raw.requested_reviewer.map(User::from),
        repository: raw.repository.map(|r| r.full_name),
    })
}
