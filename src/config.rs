//! Process configuration.
//!
//! Every flag can also be supplied through its environment variable, and a
//! `.env` file in the working directory is loaded before parsing.

use std::time::Duration;

use clap::Parser;

use crate::chat::DiscordConfig;
use crate::sync::SyncConfig;
use crate::types::ChannelId;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pr-thread-relay",
    about = "Relays GitHub pull request events into one Discord thread per PR",
    version
)]
pub struct Config {
    #[arg(
        long,
        env = "DISCORD_TOKEN",
        hide_env_values = true,
        help = "Discord bot token"
    )]
    pub discord_token: String,

    #[arg(
        long,
        env = "DISCORD_CHANNEL_ID",
        help = "Channel in which PR threads are created"
    )]
    pub channel_id: Option<String>,

    #[arg(
        long,
        env = "GITHUB_WEBHOOK_SECRET",
        hide_env_values = true,
        help = "Shared secret for X-Hub-Signature-256 verification. Without it every webhook is rejected."
    )]
    pub webhook_secret: Option<String>,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(
        long,
        env = "DISCORD_API_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Base URL of the Discord REST API"
    )]
    pub discord_api_base: String,

    #[arg(
        long,
        env = "CALL_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Upper bound in seconds on each Discord call"
    )]
    pub call_timeout_secs: u64,
}

impl Config {
    /// Loads `.env` (if present) and parses flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Config::parse()
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ChannelId::new)
    }

    /// The webhook secret as bytes; an empty secret counts as unset.
    pub fn webhook_secret(&self) -> Option<Vec<u8>> {
        self.webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_bytes().to_vec())
    }

    pub fn discord(&self) -> DiscordConfig {
        DiscordConfig {
            api_base: self.discord_api_base.clone(),
            token: self.discord_token.clone(),
            request_timeout: self.call_timeout(),
        }
    }

    pub fn sync(&self) -> SyncConfig {
        SyncConfig::new(self.channel_id()).with_call_timeout(self.call_timeout())
    }
}
