//! Chat-platform capability used by the synchronizer.
//!
//! The synchronizer never talks to Discord directly. It depends on the
//! [`ThreadClient`] trait, which covers exactly the operations the relay needs:
//! resolve the destination channel, create a thread, fetch a thread, post to
//! it, and toggle its archival state.
//!
//! [`DiscordClient`] implements the trait against the Discord REST API; tests
//! substitute an in-memory double.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::types::{ChannelId, ThreadId};

mod discord;
mod error;

pub use discord::{BotUser, DiscordClient, DiscordConfig};
pub use error::ChatError;

/// Maximum length of a Discord message, in characters.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// The kind of a chat channel, as far as the relay cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// A text channel that threads can be created under.
    Text,
    /// Anything else (voice, category, forum, ...), with the raw platform type.
    Other(u8),
}

/// A resolved chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub kind: ChannelKind,
}

impl Channel {
    /// Returns true if threads can be created and posted under this channel.
    pub fn is_postable(&self) -> bool {
        self.kind == ChannelKind::Text
    }
}

/// A live thread as resolved from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle {
    pub id: ThreadId,
    pub name: String,
    pub archived: bool,
}

/// Chat operations the synchronizer depends on.
///
/// Lookups return `Ok(None)` when the object does not exist; every other
/// failure is a [`ChatError`].
///
/// # Example (test double)
///
/// ```ignore
/// struct NullClient;
///
/// impl ThreadClient for NullClient {
///     async fn fetch_channel(&self, _: &ChannelId) -> Result<Option<Channel>, ChatError> {
///         Ok(None)
///     }
///     // ...
/// }
/// ```
pub trait ThreadClient: Send + Sync {
    /// Resolves a channel by ID.
    fn fetch_channel(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = Result<Option<Channel>, ChatError>> + Send;

    /// Creates a public thread named `name` under `channel`.
    fn create_thread(
        &self,
        channel: &ChannelId,
        name: &str,
    ) -> impl Future<Output = Result<ThreadHandle, ChatError>> + Send;

    /// Resolves a thread by ID.
    fn fetch_thread(
        &self,
        thread: &ThreadId,
    ) -> impl Future<Output = Result<Option<ThreadHandle>, ChatError>> + Send;

    /// Posts a message to a thread.
    fn send(
        &self,
        thread: &ThreadId,
        content: &str,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;

    /// Archives or unarchives a thread.
    fn set_archived(
        &self,
        thread: &ThreadId,
        archived: bool,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;
}

/// Truncates `s` to at most `max` characters, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
