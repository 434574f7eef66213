//! Pull request and review snapshots.
//!
//! A [`PullRequest`] is an immutable snapshot taken from a single webhook
//! delivery. The relay never diffs two snapshots; it reacts to the action that
//! accompanied the delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PrId, PrNumber};

/// A GitHub account referenced by a pull request or review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
}

impl User {
    pub fn new(id: u64, login: impl Into<String>) -> Self {
        User {
            id,
            login: login.into(),
        }
    }
}

/// The open/closed state GitHub reports for a pull request.
///
/// Merged PRs are `Closed` with [`PullRequest::merged`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    Open,
    Closed,
}

/// The verdict of a pull request review.
///
/// Webhook payloads use lowercase states while the REST API uses
/// SCREAMING_SNAKE_CASE; [`ReviewState::parse`] accepts both. States GitHub adds
/// in the future are kept verbatim in `Other` so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl ReviewState {
    /// Parses a review state as it appears in a webhook payload.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "approved" => ReviewState::Approved,
            "changes_requested" => ReviewState::ChangesRequested,
            "commented" => ReviewState::Commented,
            "dismissed" => ReviewState::Dismissed,
            "pending" => ReviewState::Pending,
            _ => ReviewState::Other(raw.to_string()),
        }
    }

    /// Returns the webhook spelling of this state.
    pub fn as_str(&self) -> &str {
        match self {
            ReviewState::Approved => "approved",
            ReviewState::ChangesRequested => "changes_requested",
            ReviewState::Commented => "commented",
            ReviewState::Dismissed => "dismissed",
            ReviewState::Pending => "pending",
            ReviewState::Other(raw) => raw,
        }
    }
}

impl From<String> for ReviewState {
    fn from(s: String) -> Self {
        ReviewState::parse(&s)
    }
}

impl From<ReviewState> for String {
    fn from(state: ReviewState) -> Self {
        state.as_str().to_string()
    }
}

/// A submitted (or pending) review on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author: User,
    pub body: Option<String>,
    pub state: ReviewState,
    /// `None` for pending reviews, which GitHub has not submitted yet.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A snapshot of a pull request as delivered with one webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Stable identity; key of the thread registry.
    pub id: PrId,

    /// Human-facing number, used in thread names and messages.
    pub number: PrNumber,

    pub title: String,

    pub body: Option<String>,

    pub html_url: String,

    pub state: PrState,

    /// Only meaningful alongside a `closed` action.
    pub merged: bool,

    pub author: User,

    pub merged_by: Option<User>,

    pub closed_by: Option<User>,

    /// Attached by the router for `pull_request_review_request` events.
    pub requested_reviewer: Option<User>,

    /// Attached by the router for `pull_request_review` events.
    pub review: Option<Review>,
}

impl PullRequest {
    /// Returns this snapshot with the given review attached.
    pub fn with_review(mut self, review: Review) -> Self {
        self.review = Some(review);
        self
    }

    /// Returns this snapshot with the given requested reviewer attached.
    pub fn with_requested_reviewer(mut self, reviewer: Option<User>) -> Self {
        self.requested_reviewer = reviewer;
        self
    }
}
