use anyhow::Result;
use serenity::{http::Http, model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod error;
mod session;
mod sources;
mod ui;

#[cfg(test)]
mod testing;

use crate::audio::voice::SongbirdGateway;
use crate::bot::MelodiaBot;
use crate::config::Config;
use crate::session::{Services, SessionSettings, SessionStore};
use crate::sources::YouTubeResolver;
use crate::ui::ChannelAnnouncer;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("melodia=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    // Health check
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    info!("🎵 Starting Melodia v{}", env!("CARGO_PKG_VERSION"));

    // Configuration
    let config = Arc::new(Config::load()?);
    info!("{}", config.summary());

    // Track resolution and voice
    let resolver = Arc::new(YouTubeResolver::new(
        config.youtube_api_key.clone(),
        config.resolver_timeout,
    )?);

    let songbird = Songbird::serenity();
    let http = Arc::new(Http::new(&config.discord_token));

    // Per-guild sessions
    let services = Services {
        resolver: resolver.clone(),
        voice: Arc::new(SongbirdGateway::new(songbird.clone(), resolver)),
        announcer: Arc::new(ChannelAnnouncer::new(http)),
        settings: SessionSettings {
            resolver_timeout: config.resolver_timeout,
            max_queue_size: config.max_queue_size,
        },
    };
    let sessions = Arc::new(SessionStore::new(services));

    // Minimal intents: prefix commands need message content
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    // Bot handler and client
    let handler = MelodiaBot::new(config.clone(), sessions);

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Graceful shutdown
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("⚠️ Shutdown signal received, closing...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Could not listen for Ctrl+C: {:?}", e),
        }
    });

    info!("🚀 Bot started");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

/// `--health-check`: the audio pipeline shells out to yt-dlp.
async fn health_check() -> Result<()> {
    let yt_dlp = async_process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    if yt_dlp.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("yt-dlp is not available");
    }
}
