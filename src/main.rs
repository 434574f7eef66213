use std::net::SocketAddr;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_thread_relay::chat::DiscordClient;
use pr_thread_relay::config::Config;
use pr_thread_relay::server::{AppState, build_router};
use pr_thread_relay::sync::{InMemoryRegistry, ThreadSynchronizer};
use pr_thread_relay::webhooks::EventRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_thread_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = DiscordClient::new(config.discord()).context("building Discord client")?;
    let bot = client
        .current_user()
        .await
        .context("validating Discord token")?;
    tracing::info!(bot_id = %bot.id, "Discord bot logged in as {}", bot.username);

    let webhook_secret = config.webhook_secret();
    if webhook_secret.is_none() {
        tracing::warn!("GITHUB_WEBHOOK_SECRET is not set; every webhook will be rejected");
    }
    if config.channel_id().is_none() {
        tracing::warn!("DISCORD_CHANNEL_ID is not set; no threads can be created");
    }

    let synchronizer = ThreadSynchronizer::new(client, InMemoryRegistry::new(), config.sync());
    let app = build_router(AppState::new(webhook_secret, EventRouter::new(synchronizer)));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serving HTTP")?;

    Ok(())
}
