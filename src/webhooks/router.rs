//! Event routing.
//!
//! Classification is a pure function of the event ([`classify`]); routing then
//! hands the PR snapshot to the synchronizer. The snapshot is enriched with
//! the review or requested reviewer for review events so that the formatter
//! only ever needs the PR.
//!
//! | Event | Action | Dispatch |
//! |-------|--------|----------|
//! | `pull_request` | `opened` | create |
//! | `pull_request` | `closed`, `reopened`, `synchronize` | update |
//! | `pull_request_review` | any | update (`review_submitted`) |
//! | `pull_request_review_request` | any | update (`review_requested`) |
//! | anything else | | ignored |

use std::sync::Arc;

use tracing::{debug, info};

use crate::chat::ThreadClient;
use crate::sync::{InMemoryRegistry, ThreadAction, ThreadRegistry, ThreadSynchronizer};
use crate::types::{PullRequest, ThreadId};

use super::events::{GitHubEvent, PrAction};

/// What an event asks the synchronizer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Create,
    Update(ThreadAction),
    /// The event/action pair is not relayed.
    Ignored,
}

/// What happened to a routed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The PR's thread was created or updated.
    Synced(ThreadId),
    /// Synchronization was attempted and failed (already logged).
    Failed,
    Ignored,
}

/// Decides what to do with an event.
pub fn classify(event: &GitHubEvent) -> Dispatch {
    match event {
        GitHubEvent::PullRequest(e) => match e.action {
            PrAction::Opened => Dispatch::Create,
            PrAction::Closed => Dispatch::Update(ThreadAction::Closed),
            PrAction::Reopened => Dispatch::Update(ThreadAction::Reopened),
            PrAction::Synchronize => Dispatch::Update(ThreadAction::Synchronize),
            PrAction::Other(_) => Dispatch::Ignored,
        },
        GitHubEvent::PullRequestReview(_) => Dispatch::Update(ThreadAction::ReviewSubmitted),
        GitHubEvent::ReviewRequest(_) => Dispatch::Update(ThreadAction::ReviewRequested),
    }
}

/// Returns the PR snapshot to synchronize, with review data attached.
fn snapshot(event: GitHubEvent) -> PullRequest {
    match event {
        GitHubEvent::PullRequest(e) => e.pull_request,
        GitHubEvent::PullRequestReview(e) => e.pull_request.with_review(e.review),
        GitHubEvent::ReviewRequest(e) => e
            .pull_request
            .with_requested_reviewer(e.requested_reviewer),
    }
}

/// Entry point from the HTTP layer into the synchronizer.
pub struct EventRouter<C, R = InMemoryRegistry> {
    synchronizer: Arc<ThreadSynchronizer<C, R>>,
}

impl<C, R> Clone for EventRouter<C, R> {
    fn clone(&self) -> Self {
        EventRouter {
            synchronizer: Arc::clone(&self.synchronizer),
        }
    }
}

impl<C, R> EventRouter<C, R>
where
    C: ThreadClient,
    R: ThreadRegistry,
{
    pub fn new(synchronizer: ThreadSynchronizer<C, R>) -> Self {
        EventRouter {
            synchronizer: Arc::new(synchronizer),
        }
    }

    pub fn synchronizer(&self) -> &ThreadSynchronizer<C, R> {
        &self.synchronizer
    }

    /// Routes one event and waits for synchronization to finish.
    pub async fn route(&self, event: GitHubEvent) -> RouteOutcome {
        let dispatch = classify(&event);

        info!(
            event_type = event.event_type(),
            action = event.action(),
            repository = event.repository().unwrap_or("unknown"),
            pr = %event.pull_request().number,
            "Received event"
        );

        let pr = snapshot(event);
        let thread = match dispatch {
            Dispatch::Create => self.synchronizer.create_thread(&pr).await,
            Dispatch::Update(action) => self.synchronizer.update_thread(&pr, action).await,
            Dispatch::Ignored => {
                debug!(pr = %pr.number, "Ignoring event");
                return RouteOutcome::Ignored;
            }
        };

        match thread {
            Some(thread) => RouteOutcome::Synced(thread.id),
            None => RouteOutcome::Failed,
        }
    }
}
