//! Thread synchronization: the stateful core of the relay.
//!
//! Each pull request maps to exactly one chat thread. The synchronizer keeps
//! that thread in step with the PR's lifecycle:
//!
//! | Current | Action | Effect | Next |
//! |---------|--------|--------|------|
//! | Absent | opened | create thread, post intro, register | Open |
//! | Absent | any update | create thread, then apply the update | Open / Closed |
//! | Open | closed (merged) | post merge message, archive | Closed |
//! | Open | closed (not merged) | post decline message, archive | Closed |
//! | Closed | reopened | unarchive, post reopen message | Open |
//! | any | synchronize / review_requested / review_submitted | post message | unchanged |
//!
//! # Module Structure
//!
//! - [`registry`]: PR id → thread record
//! - [`gate`]: per-PR mutual exclusion
//! - [`format`]: message rendering
//! - [`synchronizer`]: the create-or-update decision

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::ChatError;
use crate::types::{ChannelId, ThreadId};

pub mod format;
pub mod gate;
pub mod registry;
pub mod synchronizer;

pub use gate::{PrGate, PrPermit};
pub use registry::{InMemoryRegistry, RegistryError, ThreadRecord, ThreadRegistry};
pub use synchronizer::{SyncConfig, ThreadSynchronizer};

/// An update applied to an existing (or recovered) thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadAction {
    /// PR closed; merged or declined depending on the snapshot.
    Closed,
    Reopened,
    /// New commits pushed.
    Synchronize,
    ReviewRequested,
    ReviewSubmitted,
}

impl ThreadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadAction::Closed => "closed",
            ThreadAction::Reopened => "reopened",
            ThreadAction::Synchronize => "synchronize",
            ThreadAction::ReviewRequested => "review_requested",
            ThreadAction::ReviewSubmitted => "review_submitted",
        }
    }
}

impl std::fmt::Display for ThreadAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a create or update did not complete.
///
/// Every variant is terminal for the delivery: it is logged and the webhook
/// is still acknowledged.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No destination channel is configured.
    #[error("destination channel is not configured")]
    ChannelNotConfigured,

    /// The configured channel does not exist or is not visible to the bot.
    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The configured channel cannot hold threads.
    #[error("channel {0} is not a text channel")]
    InvalidChannel(ChannelId),

    /// The registry points at a thread that no longer resolves.
    #[error("thread {0} not found")]
    ThreadNotFound(ThreadId),

    /// A chat-platform call failed.
    #[error(transparent)]
    Chat(#[from] ChatError),
}
