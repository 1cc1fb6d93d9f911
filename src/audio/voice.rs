use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::{tracks::TrackHandle, Call, Event, Songbird, TrackEvent};
use std::{fmt::Display, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{
    audio::player::TrackControl, bot::events::TrackEndHandler, session::TrackEndNotifier,
    sources::YouTubeResolver,
};

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("couldn't join the voice channel: {0}")]
    Join(String),

    #[error("playback control failed: {0}")]
    Control(String),

    #[error("couldn't leave the voice channel: {0}")]
    Disconnect(String),
}

/// Opens voice connections.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceConnection>, VoiceError>;
}

/// A live voice connection for one guild.
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    fn channel_id(&self) -> ChannelId;

    /// Loads `url` and starts it. `on_end` must fire once the track ends or
    /// errors, whatever the cause.
    async fn play(
        &self,
        url: &str,
        on_end: TrackEndNotifier,
    ) -> Result<Box<dyn TrackControl>, VoiceError>;

    async fn disconnect(&self) -> Result<(), VoiceError>;

    /// Whether the underlying call is still joined to a channel.
    async fn is_live(&self) -> bool;
}

pub struct SongbirdGateway {
    manager: Arc<Songbird>,
    resolver: Arc<YouTubeResolver>,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>, resolver: Arc<YouTubeResolver>) -> Self {
        Self { manager, resolver }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceConnection>, VoiceError> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| {
                error!("Error joining voice channel {} in guild {}: {:?}", channel_id, guild_id, e);
                VoiceError::Join(e.to_string())
            })?;

        info!("🔊 Connected to voice channel {} in guild {}", channel_id, guild_id);

        Ok(Arc::new(SongbirdConnection {
            guild_id,
            channel_id,
            call,
            manager: self.manager.clone(),
            resolver: self.resolver.clone(),
        }))
    }
}

struct SongbirdConnection {
    guild_id: GuildId,
    channel_id: ChannelId,
    call: Arc<Mutex<Call>>,
    manager: Arc<Songbird>,
    resolver: Arc<YouTubeResolver>,
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    async fn play(
        &self,
        url: &str,
        on_end: TrackEndNotifier,
    ) -> Result<Box<dyn TrackControl>, VoiceError> {
        let input = self.resolver.open_audio_stream(url);

        let track = {
            let mut call = self.call.lock().await;
            call.play_input(input)
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            let handler = TrackEndHandler::new(self.guild_id, on_end.clone());
            if let Err(e) = track.add_event(Event::Track(event), handler) {
                let _ = track.stop();
                return Err(control_error(e));
            }
        }

        Ok(Box::new(SongbirdTrack(track)))
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        self.manager
            .remove(self.guild_id)
            .await
            .map_err(|e| VoiceError::Disconnect(e.to_string()))?;

        info!("👋 Left voice channel in guild {}", self.guild_id);
        Ok(())
    }

    async fn is_live(&self) -> bool {
        self.call.lock().await.current_channel().is_some()
    }
}

struct SongbirdTrack(TrackHandle);

impl TrackControl for SongbirdTrack {
    fn pause(&self) -> Result<(), VoiceError> {
        self.0.pause().map_err(control_error)
    }

    fn resume(&self) -> Result<(), VoiceError> {
        self.0.play().map_err(control_error)
    }

    fn stop(&self) -> Result<(), VoiceError> {
        self.0.stop().map_err(control_error)
    }
}

fn control_error(e: impl Display) -> VoiceError {
    VoiceError::Control(e.to_string())
}
