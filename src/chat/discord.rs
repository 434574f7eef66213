//! Discord REST client implementing [`ThreadClient`].
//!
//! Only the handful of endpoints the relay needs are wrapped:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | fetch channel / thread | `GET /channels/{id}` |
//! | create thread | `POST /channels/{id}/threads` |
//! | send | `POST /channels/{id}/messages` |
//! | archive / unarchive | `PATCH /channels/{id}` |
//! | token check | `GET /users/@me` |

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::{
    Channel, ChannelKind, ChatError, MESSAGE_MAX_CHARS, ThreadClient, ThreadHandle, truncate_chars,
};
use crate::types::{ChannelId, ThreadId};

/// Discord channel type for a guild text channel.
const GUILD_TEXT: u8 = 0;
/// Discord channel types for announcement, public, and private threads.
const THREAD_TYPES: [u8; 3] = [10, 11, 12];
/// Discord channel type used when creating a public thread.
const PUBLIC_THREAD: u8 = 11;
/// Minutes of inactivity after which Discord auto-archives a new thread.
const AUTO_ARCHIVE_MINUTES: u32 = 60;

/// Configuration for [`DiscordClient`].
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Base URL including the API version, e.g. `https://discord.com/api/v10`.
    pub api_base: String,
    pub token: String,
    pub request_timeout: Duration,
}

/// The account the bot token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
    name: Option<String>,
    thread_metadata: Option<RawThreadMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawThreadMetadata {
    archived: bool,
}

impl RawChannel {
    fn into_thread_handle(self) -> ThreadHandle {
        ThreadHandle {
            id: ThreadId(self.id),
            name: self.name.unwrap_or_default(),
            archived: self.thread_metadata.is_some_and(|m| m.archived),
        }
    }
}

/// A Discord REST API client authenticated with a bot token.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    /// Builds a client. Each request is bounded by `config.request_timeout`.
    pub fn new(config: DiscordConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    /// Returns the account the token authenticates as.
    ///
    /// Used at startup to fail fast on a bad token.
    pub async fn current_user(&self) -> Result<BotUser, ChatError> {
        let response = self.request(Method::GET, "/users/@me", None).await?;
        decode(check(response).await?).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ChatError> {
        debug!(method = %method, path = %path, "Discord request");
        let mut request = self
            .http
            .request(method, format!("{}{}", self.api_base, path))
            .header(AUTHORIZATION, format!("Bot {}", self.token));
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }

    /// Fetches `/channels/{id}`, mapping 404 to `None`.
    async fn get_channel(&self, id: &str) -> Result<Option<RawChannel>, ChatError> {
        let response = self
            .request(Method::GET, &format!("/channels/{}", id), None)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(check(response).await?).await.map(Some)
    }
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// Turns non-success responses into [`ChatError::Http`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ChatError::Http {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChatError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ChatError::Decode(e.to_string()))
}

impl ThreadClient for DiscordClient {
    async fn fetch_channel(&self, channel: &ChannelId) -> Result<Option<Channel>, ChatError> {
        let raw = self.get_channel(channel.as_str()).await?;
        Ok(raw.map(|raw| Channel {
            id: ChannelId(raw.id),
            kind: if raw.kind == GUILD_TEXT {
                ChannelKind::Text
            } else {
                ChannelKind::Other(raw.kind)
            },
        }))
    }

    async fn create_thread(
        &self,
        channel: &ChannelId,
        name: &str,
    ) -> Result<ThreadHandle, ChatError> {
        let body = json!({
            "name": name,
            "type": PUBLIC_THREAD,
            "auto_archive_duration": AUTO_ARCHIVE_MINUTES,
        });
        let response = self
            .request(
                Method::POST,
                &format!("/channels/{}/threads", channel),
                Some(body),
            )
            .await?;
        let raw: RawChannel = decode(check(response).await?).await?;
        Ok(raw.into_thread_handle())
    }

    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Option<ThreadHandle>, ChatError> {
        let raw = self.get_channel(thread.as_str()).await?;
        Ok(raw
            .filter(|raw| THREAD_TYPES.contains(&raw.kind))
            .map(RawChannel::into_thread_handle))
    }

    async fn send(&self, thread: &ThreadId, content: &str) -> Result<(), ChatError> {
        let body = json!({ "content": truncate_chars(content, MESSAGE_MAX_CHARS) });
        let response = self
            .request(
                Method::POST,
                &format!("/channels/{}/messages", thread),
                Some(body),
            )
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn set_archived(&self, thread: &ThreadId, archived: bool) -> Result<(), ChatError> {
        let response = self
            .request(
                Method::PATCH,
                &format!("/channels/{}", thread),
                Some(json!({ "archived": archived })),
            )
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, PATCH, POST};
    use httpmock::MockServer;

    fn client(server: &MockServer) -> DiscordClient {
        DiscordClient::new(DiscordConfig {
            api_base: format!("{}/", server.base_url()),
            token: "test-token".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_channel_maps_text_channel() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/channels/100")
                    .header("authorization", "Bot test-token");
                then.status(200)
                    .json_body(json!({ "id": "100", "type": 0, "name": "pull-requests" }));
            })
            .await;

        let channel = client(&server)
            .fetch_channel(&ChannelId::new("100"))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(channel.kind, ChannelKind::Text);
        assert!(channel.is_postable());
    }

    #[tokio::test]
    async fn fetch_channel_maps_other_types() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/100");
                then.status(200).json_body(json!({ "id": "100", "type": 2 }));
            })
            .await;

        let channel = client(&server)
            .fetch_channel(&ChannelId::new("100"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(channel.kind, ChannelKind::Other(2));
    }

    #[tokio::test]
    async fn fetch_thread_returns_none_on_404() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/555");
                then.status(404)
                    .json_body(json!({ "message": "Unknown Channel", "code": 10003 }));
            })
            .await;

        let thread = client(&server)
            .fetch_thread(&ThreadId::new("555"))
            .await
            .unwrap();

        assert!(thread.is_none());
    }

    #[tokio::test]
    async fn fetch_thread_reads_archived_flag() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/555");
                then.status(200).json_body(json!({
                    "id": "555",
                    "type": 11,
                    "name": "PR #42: Fix bug",
                    "thread_metadata": { "archived": true, "auto_archive_duration": 60 }
                }));
            })
            .await;

        let thread = client(&server)
            .fetch_thread(&ThreadId::new("555"))
            .await
            .unwrap()
            .unwrap();

        assert!(thread.archived);
        assert_eq!(thread.name, "PR #42: Fix bug");
    }

    #[tokio::test]
    async fn create_thread_posts_public_thread() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/channels/100/threads").json_body(json!({
                    "name": "PR #42: Fix bug",
                    "type": 11,
                    "auto_archive_duration": 60
                }));
                then.status(201).json_body(json!({
                    "id": "555",
                    "type": 11,
                    "name": "PR #42: Fix bug",
                    "thread_metadata": { "archived": false }
                }));
            })
            .await;

        let thread = client(&server)
            .create_thread(&ChannelId::new("100"), "PR #42: Fix bug")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(thread.id, ThreadId::new("555"));
        assert!(!thread.archived);
    }

    #[tokio::test]
    async fn send_truncates_to_message_limit() {
        let server = MockServer::start_async().await;
        let long = "x".repeat(MESSAGE_MAX_CHARS + 50);
        let expected = "x".repeat(MESSAGE_MAX_CHARS);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/channels/555/messages")
                    .json_body(json!({ "content": expected }));
                then.status(200).json_body(json!({ "id": "1" }));
            })
            .await;

        client(&server)
            .send(&ThreadId::new("555"), &long)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn set_archived_patches_channel() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/channels/555")
                    .json_body(json!({ "archived": false }));
                then.status(200).json_body(json!({ "id": "555", "type": 11 }));
            })
            .await;

        client(&server)
            .set_archived(&ThreadId::new("555"), false)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn permission_error_surfaces_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/channels/555/messages");
                then.status(403)
                    .json_body(json!({ "message": "Missing Permissions", "code": 50013 }));
            })
            .await;

        let err = client(&server)
            .send(&ThreadId::new("555"), "hello")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(403));
    }

    #[tokio::test]
    async fn current_user_decodes_bot_account() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/@me");
                then.status(200)
                    .json_body(json!({ "id": "9", "username": "pr-bot", "bot": true }));
            })
            .await;

        let user = client(&server).current_user().await.unwrap();
        assert_eq!(user.username, "pr-bot");
    }
}
