//! Create-or-update decision for PR threads.
//!
//! All registry reads and the single registry write happen while holding the
//! PR's [`PrGate`] permit, so concurrent deliveries for one PR see a
//! consistent "has a thread / has none" answer. The registry is written only
//! after the thread exists and its intro message was posted.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::chat::{ChatError, ThreadClient, ThreadHandle};
use crate::types::{ChannelId, PrState, PullRequest, ThreadId};

use super::format;
use super::gate::PrGate;
use super::registry::{InMemoryRegistry, ThreadRecord, ThreadRegistry};
use super::{SyncError, ThreadAction};

/// Default bound on each chat-platform call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`ThreadSynchronizer`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Channel new threads are created under.
    pub channel_id: Option<ChannelId>,

    /// Upper bound on each chat-platform call.
    pub call_timeout: Duration,
}

impl SyncConfig {
    pub fn new(channel_id: Option<ChannelId>) -> Self {
        SyncConfig {
            channel_id,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Keeps one chat thread per pull request in step with the PR's lifecycle.
///
/// Generic over the chat capability and the registry so tests can substitute
/// both.
pub struct ThreadSynchronizer<C, R = InMemoryRegistry> {
    client: C,
    registry: R,
    gate: PrGate,
    config: SyncConfig,
}

impl<C, R> ThreadSynchronizer<C, R>
where
    C: ThreadClient,
    R: ThreadRegistry,
{
    pub fn new(client: C, registry: R, config: SyncConfig) -> Self {
        ThreadSynchronizer {
            client,
            registry,
            gate: PrGate::new(),
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Creates the thread for a newly opened PR.
    ///
    /// If the PR already has a thread (a redelivered `opened`), no second
    /// thread is created; the existing one is resolved and returned.
    ///
    /// Returns `None` on any failure, after logging it.
    #[instrument(skip_all, fields(pr = %pr.number, pr_id = %pr.id))]
    pub async fn create_thread(&self, pr: &PullRequest) -> Option<ThreadHandle> {
        let _permit = self.gate.acquire(pr.id).await;

        let result = match self.registry.lookup(pr.id) {
            Some(record) => {
                debug!(thread_id = %record.thread_id, "PR already has a thread");
                self.resolve(&record.thread_id).await
            }
            None => self.create_locked(pr).await,
        };

        match result {
            Ok(thread) => Some(thread),
            Err(e) => {
                error!(error = %e, "Failed to create thread for PR {}", pr.number);
                None
            }
        }
    }

    /// Applies `action` to the PR's thread.
    ///
    /// A PR without a thread (its `opened` delivery was missed) gets one
    /// created first, then the action is applied to it.
    ///
    /// Returns `None` on any failure, after logging it.
    #[instrument(skip_all, fields(pr = %pr.number, pr_id = %pr.id, action = %action))]
    pub async fn update_thread(
        &self,
        pr: &PullRequest,
        action: ThreadAction,
    ) -> Option<ThreadHandle> {
        let _permit = self.gate.acquire(pr.id).await;

        match self.update_locked(pr, action).await {
            Ok(thread) => {
                info!(thread_id = %thread.id, "Updated thread for PR {}", pr.number);
                Some(thread)
            }
            Err(e) => {
                error!(error = %e, "Failed to update thread for PR {}", pr.number);
                None
            }
        }
    }

    async fn update_locked(
        &self,
        pr: &PullRequest,
        action: ThreadAction,
    ) -> Result<ThreadHandle, SyncError> {
        let thread = match self.registry.lookup(pr.id) {
            Some(record) => self.resolve(&record.thread_id).await?,
            None => {
                info!("No thread found for PR {}, creating one", pr.number);
                self.create_locked(pr).await?
            }
        };

        self.apply(thread, pr, action).await
    }

    /// Creates the thread and posts the intro. Caller holds the PR permit.
    async fn create_locked(&self, pr: &PullRequest) -> Result<ThreadHandle, SyncError> {
        let channel_id = self
            .config
            .channel_id
            .as_ref()
            .ok_or(SyncError::ChannelNotConfigured)?;

        let channel = self
            .call("fetch_channel", self.client.fetch_channel(channel_id))
            .await?
            .ok_or_else(|| SyncError::ChannelNotFound(channel_id.clone()))?;
        if !channel.is_postable() {
            return Err(SyncError::InvalidChannel(channel.id));
        }

        let name = format::thread_name(pr);
        let thread = self
            .call("create_thread", self.client.create_thread(&channel.id, &name))
            .await?;
        self.call(
            "send",
            self.client.send(&thread.id, &format::intro_message(pr)),
        )
        .await?;

        let record = ThreadRecord {
            thread_id: thread.id.clone(),
            pr_number: pr.number,
        };
        if let Err(e) = self.registry.record(pr.id, record) {
            // Unreachable while the gate is held; keep the existing record.
            error!(error = %e, "Registry already had a record for PR {}", pr.number);
        }

        info!(thread_id = %thread.id, "Created thread for PR {}", pr.number);
        Ok(thread)
    }

    async fn resolve(&self, thread_id: &ThreadId) -> Result<ThreadHandle, SyncError> {
        self.call("fetch_thread", self.client.fetch_thread(thread_id))
            .await?
            .ok_or_else(|| SyncError::ThreadNotFound(thread_id.clone()))
    }

    async fn apply(
        &self,
        mut thread: ThreadHandle,
        pr: &PullRequest,
        action: ThreadAction,
    ) -> Result<ThreadHandle, SyncError> {
        let Some(message) = format::update_message(action, pr) else {
            warn!("Review object is missing, nothing to post");
            return Ok(thread);
        };

        match action {
            ThreadAction::Closed => {
                self.call("send", self.client.send(&thread.id, &message))
                    .await?;
                self.call("set_archived", self.client.set_archived(&thread.id, true))
                    .await?;
                thread.archived = true;
            }
            ThreadAction::Reopened => {
                self.call("set_archived", self.client.set_archived(&thread.id, false))
                    .await?;
                thread.archived = false;
                self.call("send", self.client.send(&thread.id, &message))
                    .await?;
            }
            ThreadAction::Synchronize
            | ThreadAction::ReviewRequested
            | ThreadAction::ReviewSubmitted => {
                self.call("send", self.client.send(&thread.id, &message))
                    .await?;
                // Posting unarchives the thread on Discord. Only a closed PR
                // is archived again.
                thread.archived = false;
                if pr.state == PrState::Closed {
                    self.call("set_archived", self.client.set_archived(&thread.id, true))
                        .await?;
                    thread.archived = true;
                }
            }
        }

        Ok(thread)
    }

    /// Runs one chat call under the configured timeout.
    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, ChatError>>,
    ) -> Result<T, ChatError> {
        let after = self.config.call_timeout;
        tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ChatError::Timeout { operation, after })?
    }
}
