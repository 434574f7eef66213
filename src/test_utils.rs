//! Shared test utilities: fixture builders, an in-memory chat client, and
//! arbitrary generators for property-based testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use crate::chat::{Channel, ChannelKind, ChatError, ThreadClient, ThreadHandle};
use crate::sync::ThreadAction;
use crate::types::{
    ChannelId, PrId, PrNumber, PrState, PullRequest, Review, ReviewState, ThreadId, User,
};

// ─── Fixture builders ───

pub fn user(id: u64, login: &str) -> User {
    User::new(id, login)
}

/// An open PR authored by `octocat` with no description.
pub fn pull_request(id: u64, number: u64, title: &str) -> PullRequest {
    PullRequest {
        id: PrId(id),
        number: PrNumber(number),
        title: title.to_string(),
        body: None,
        html_url: format!("https://github.com/octocat/hello-world/pull/{}", number),
        state: PrState::Open,
        merged: false,
        author: user(1, "octocat"),
        merged_by: None,
        closed_by: None,
        requested_reviewer: None,
        review: None,
    }
}

pub fn review(login: &str, state: ReviewState, body: Option<&str>) -> Review {
    Review {
        id: 9,
        author: user(2, login),
        body: body.map(str::to_string),
        state,
        submitted_at: None,
    }
}

// ─── In-memory chat client ───

/// A chat call as observed by [`MockThreadClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchChannel(ChannelId),
    CreateThread(ChannelId, String),
    FetchThread(ThreadId),
    Send(ThreadId, String),
    SetArchived(ThreadId, bool),
}

#[derive(Debug, Default)]
struct MockThread {
    name: String,
    archived: bool,
    messages: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    channels: HashMap<ChannelId, ChannelKind>,
    threads: HashMap<ThreadId, MockThread>,
    next_thread: u64,
    calls: Vec<MockCall>,
}

/// An in-memory [`ThreadClient`] that records every call.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another. Thread IDs are assigned sequentially per client.
#[derive(Debug, Clone, Default)]
pub struct MockThreadClient {
    state: Arc<Mutex<MockState>>,
    latency: Duration,
    fail_on: Option<&'static str>,
}

impl MockThreadClient {
    pub fn with_channel(id: &str, kind: ChannelKind) -> Self {
        let client = Self::default();
        client.lock().channels.insert(ChannelId::new(id), kind);
        client
    }

    pub fn with_text_channel(id: &str) -> Self {
        Self::with_channel(id, ChannelKind::Text)
    }

    /// Delays every call by `ms` milliseconds.
    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        self.latency = Duration::from_millis(ms);
        self
    }

    /// Makes every call to `operation` fail with HTTP 500.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn thread_count(&self) -> usize {
        self.lock().threads.len()
    }

    pub fn thread_names(&self) -> Vec<String> {
        self.lock().threads.values().map(|t| t.name.clone()).collect()
    }

    pub fn messages(&self, thread: &ThreadId) -> Vec<String> {
        self.lock()
            .threads
            .get(thread)
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }

    pub fn is_archived(&self, thread: &ThreadId) -> bool {
        self.lock().threads.get(thread).is_some_and(|t| t.archived)
    }

    /// Removes a thread as if it had been deleted out-of-band.
    pub fn delete_thread(&self, thread: &ThreadId) {
        self.lock().threads.remove(thread);
    }

    async fn enter(&self, operation: &'static str, call: MockCall) -> Result<(), ChatError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.lock().calls.push(call);
        if self.fail_on == Some(operation) {
            return Err(ChatError::Http {
                status: 500,
                message: format!("injected failure in {}", operation),
            });
        }
        Ok(())
    }
}

fn not_found(what: impl std::fmt::Display) -> ChatError {
    ChatError::Http {
        status: 404,
        message: format!("Unknown Channel {}", what),
    }
}

impl ThreadClient for MockThreadClient {
    async fn fetch_channel(&self, channel: &ChannelId) -> Result<Option<Channel>, ChatError> {
        self.enter("fetch_channel", MockCall::FetchChannel(channel.clone()))
            .await?;
        Ok(self.lock().channels.get(channel).map(|kind| Channel {
            id: channel.clone(),
            kind: *kind,
        }))
    }

    async fn create_thread(
        &self,
        channel: &ChannelId,
        name: &str,
    ) -> Result<ThreadHandle, ChatError> {
        self.enter(
            "create_thread",
            MockCall::CreateThread(channel.clone(), name.to_string()),
        )
        .await?;
        let mut state = self.lock();
        if !state.channels.contains_key(channel) {
            return Err(not_found(channel));
        }
        state.next_thread += 1;
        let id = ThreadId(format!("thread-{}", state.next_thread));
        state.threads.insert(
            id.clone(),
            MockThread {
                name: name.to_string(),
                ..MockThread::default()
            },
        );
        Ok(ThreadHandle {
            id,
            name: name.to_string(),
            archived: false,
        })
    }

    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Option<ThreadHandle>, ChatError> {
        self.enter("fetch_thread", MockCall::FetchThread(thread.clone()))
            .await?;
        Ok(self.lock().threads.get(thread).map(|t| ThreadHandle {
            id: thread.clone(),
            name: t.name.clone(),
            archived: t.archived,
        }))
    }

    async fn send(&self, thread: &ThreadId, content: &str) -> Result<(), ChatError> {
        self.enter("send", MockCall::Send(thread.clone(), content.to_string()))
            .await?;
        let mut state = self.lock();
        let t = state.threads.get_mut(thread).ok_or_else(|| not_found(thread))?;
        t.messages.push(content.to_string());
        // Discord unarchives a thread when a message is posted to it.
        t.archived = false;
        Ok(())
    }

    async fn set_archived(&self, thread: &ThreadId, archived: bool) -> Result<(), ChatError> {
        self.enter("set_archived", MockCall::SetArchived(thread.clone(), archived))
            .await?;
        let mut state = self.lock();
        let t = state.threads.get_mut(thread).ok_or_else(|| not_found(thread))?;
        t.archived = archived;
        Ok(())
    }
}

// ─── Arbitrary generators ───

pub fn arb_user() -> impl Strategy<Value = User> {
    (any::<u64>(), "[a-z][a-z0-9-]{0,15}").prop_map(|(id, login)| User::new(id, login))
}

pub fn arb_review_state() -> impl Strategy<Value = ReviewState> {
    prop_oneof![
        Just(ReviewState::Approved),
        Just(ReviewState::ChangesRequested),
        Just(ReviewState::Commented),
        Just(ReviewState::Dismissed),
        Just(ReviewState::Pending),
        "[a-z_]{1,12}".prop_map(ReviewState::Other),
    ]
}

pub fn arb_review() -> impl Strategy<Value = Review> {
    (
        any::<u64>(),
        arb_user(),
        prop::option::of("[a-zA-Z0-9 .\n]{0,80}"),
        arb_review_state(),
    )
        .prop_map(|(id, author, body, state)| Review {
            id,
            author,
            body,
            state,
            submitted_at: None,
        })
}

pub fn arb_thread_action() -> impl Strategy<Value = ThreadAction> {
    prop_oneof![
        Just(ThreadAction::Closed),
        Just(ThreadAction::Reopened),
        Just(ThreadAction::Synchronize),
        Just(ThreadAction::ReviewRequested),
        Just(ThreadAction::ReviewSubmitted),
    ]
}

pub fn arb_pull_request() -> impl Strategy<Value = PullRequest> {
    (
        (any::<u64>(), 1u64..100_000, "[ -~]{1,150}", prop::option::of("[ -~\n]{0,200}")),
        (any::<bool>(), arb_user(), prop::option::of(arb_user())),
        (prop::option::of(arb_user()), prop::option::of(arb_review())),
    )
        .prop_map(
            |((id, number, title, body), (merged, author, merged_by), (reviewer, review))| {
                PullRequest {
                    id: PrId(id),
                    number: PrNumber(number),
                    title,
                    body,
                    html_url: format!("https://github.com/octocat/hello-world/pull/{}", number),
                    state: if merged { PrState::Closed } else { PrState::Open },
                    merged,
                    author,
                    merged_by,
                    closed_by: None,
                    requested_reviewer: reviewer,
                    review,
                }
            },
        )
}
