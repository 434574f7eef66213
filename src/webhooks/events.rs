//! GitHub webhook event types.
//!
//! Typed representations of the three webhook events the relay listens to.
//! Event types outside this set are dropped by the parser before they get
//! here.
//!
//! - `pull_request` - PR lifecycle (opened, closed, reopened, synchronize)
//! - `pull_request_review` - a review was submitted, edited, or dismissed
//! - `pull_request_review_request` - a reviewer was requested

use serde::{Deserialize, Serialize};

use crate::types::{PullRequest, Review, User};

/// A parsed GitHub webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    PullRequest(PullRequestEvent),
    PullRequestReview(PullRequestReviewEvent),
    ReviewRequest(ReviewRequestEvent),
}

impl GitHubEvent {
    /// Returns the `X-GitHub-Event` name of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            GitHubEvent::PullRequest(_) => "pull_request",
            GitHubEvent::PullRequestReview(_) => "pull_request_review",
            GitHubEvent::ReviewRequest(_) => "pull_request_review_request",
        }
    }

    /// Returns the raw `action` label of the delivery.
    pub fn action(&self) -> &str {
        match self {
            GitHubEvent::PullRequest(e) => e.action.as_str(),
            GitHubEvent::PullRequestReview(e) => &e.action,
            GitHubEvent::ReviewRequest(e) => &e.action,
        }
    }

    /// Returns the pull request snapshot carried by the event.
    pub fn pull_request(&self) -> &PullRequest {
        match self {
            GitHubEvent::PullRequest(e) => &e.pull_request,
            GitHubEvent::PullRequestReview(e) => &e.pull_request,
            GitHubEvent::ReviewRequest(e) => &e.pull_request,
        }
    }

    /// Returns the repository `owner/name`, if the payload included one.
    pub fn repository(&self) -> Option<&str> {
        match self {
            GitHubEvent::PullRequest(e) => e.repository.as_deref(),
            GitHubEvent::PullRequestReview(e) => e.repository.as_deref(),
            GitHubEvent::ReviewRequest(e) => e.repository.as_deref(),
        }
    }
}

/// Action performed on a pull request.
///
/// Actions the relay does not act on are kept in `Other` so they can still be
/// logged and acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    Opened,
    Closed,
    Reopened,
    /// New commits were pushed to the head branch.
    Synchronize,
    Other(String),
}

impl PrAction {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "opened" => PrAction::Opened,
            "closed" => PrAction::Closed,
            "reopened" => PrAction::Reopened,
            "synchronize" => PrAction::Synchronize,
            other => PrAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrAction::Opened => "opened",
            PrAction::Closed => "closed",
            PrAction::Reopened => "reopened",
            PrAction::Synchronize => "synchronize",
            PrAction::Other(raw) => raw,
        }
    }
}

/// A `pull_request` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: PrAction,
    pub pull_request: PullRequest,
    /// `repository.full_name`, e.g. `octocat/hello-world`.
    pub repository: Option<String>,
}

/// A `pull_request_review` event.
///
/// Every action (submitted, edited, dismissed) is relayed the same way, so
/// the action is kept as the raw label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviewEvent {
    pub action: String,
    pub pull_request: PullRequest,
    pub review: Review,
    pub repository: Option<String>,
}

/// A `pull_request_review_request` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequestEvent {
    pub action: String,
    pub pull_request: PullRequest,
    /// Absent when a team rather than a user was requested.
    pub requested_reviewer: Option<User>,
    pub repository: Option<String>,
}
