//! # Session Module
//!
//! Per-guild playback sessions.
//!
//! A [`Session`] owns the voice connection, the [`AudioPlayer`] and the
//! [`TrackQueue`] of one guild and implements every queue mutation the bot
//! supports. Sessions are shared as `Arc<tokio::sync::Mutex<Session>>`
//! ([`SharedSession`]): every command and every end-of-track notification
//! runs with that lock held, so a guild's state is never mutated by two
//! tasks at once.
//!
//! ## Idle transition
//!
//! Whenever the player goes Idle the session advances: the next track in the
//! queue starts, or, if the queue is empty, the connection is released. Forced
//! stops (`next`, `stop`) advance synchronously inside the command. Natural
//! ends arrive through a [`TrackEndNotifier`]; its [`TrackToken`] is checked
//! against the loaded track so the late event of a track that a command
//! already stopped does not advance a second time.
//!
//! ## Invariant
//!
//! `connection` is present iff the queue is non-empty or a track is loaded.

pub mod store;

use futures::future::join_all;
use serenity::model::id::{ChannelId, GuildId};
use std::{
    future::Future,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    audio::{
        player::{AudioPlayer, PlayerState, TrackToken},
        queue::TrackQueue,
        voice::{VoiceConnection, VoiceGateway},
    },
    error::CommandError,
    sources::{ResolverError, TrackResolver},
    ui::{replies, Announcer},
};

pub use store::SessionStore;

pub type SharedSession = Arc<Mutex<Session>>;

/// Upcoming tracks whose titles are looked up for the queue listing.
const QUEUE_PREVIEW: usize = 20;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub resolver_timeout: Duration,
    pub max_queue_size: usize,
}

/// Collaborators shared by every session.
pub struct Services {
    pub resolver: Arc<dyn TrackResolver>,
    pub voice: Arc<dyn VoiceGateway>,
    pub announcer: Arc<dyn Announcer>,
    pub settings: SessionSettings,
}

/// Delivers the end of one loaded track back to its session.
#[derive(Clone)]
pub struct TrackEndNotifier {
    session: Weak<Mutex<Session>>,
    token: TrackToken,
}

impl TrackEndNotifier {
    pub fn token(&self) -> TrackToken {
        self.token
    }

    /// Locks the session and runs its Idle transition for this track.
    /// `failure` carries the playback error when the track did not end on
    /// its own.
    pub async fn notify(&self, failure: Option<String>) {
        let Some(session) = self.session.upgrade() else {
            return;
        };

        let mut session = session.lock().await;
        session.on_track_end(self.token, failure).await;
    }
}

pub struct Session {
    guild_id: GuildId,
    connection: Option<Arc<dyn VoiceConnection>>,
    player: AudioPlayer,
    queue: TrackQueue,
    /// Where unsolicited announcements go: the channel of the last command.
    text_channel: Option<ChannelId>,
    services: Arc<Services>,
    this: Weak<Mutex<Session>>,
}

impl Session {
    pub fn shared(guild_id: GuildId, services: Arc<Services>) -> SharedSession {
        Arc::new_cyclic(|this| {
            Mutex::new(Self {
                guild_id,
                connection: None,
                player: AudioPlayer::new(),
                queue: TrackQueue::new(services.settings.max_queue_size),
                text_channel: None,
                services,
                this: this.clone(),
            })
        })
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    #[cfg(test)]
    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    pub fn set_text_channel(&mut self, channel_id: ChannelId) {
        self.text_channel = Some(channel_id);
    }

    /// Resolves `query`, joins the caller's channel if needed and queues the
    /// track. Starts it right away when nothing was queued.
    pub async fn play(
        &mut self,
        query: &str,
        caller_channel: Option<ChannelId>,
    ) -> Result<String, CommandError> {
        let channel_id = caller_channel.ok_or(CommandError::NotInVoiceChannel)?;

        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::MissingQuery);
        }

        // Resolve before touching the connection so a failed lookup leaves
        // the session exactly as it was.
        let url = self.resolve(query).await?;

        if self.connection.is_none() {
            let connection = self.services.voice.connect(self.guild_id, channel_id).await?;
            self.connection = Some(connection);
        }

        let was_empty = self.queue.is_empty();
        self.queue.push(url.clone())?;

        if !was_empty {
            let title = self.title_or_unknown(&url).await;
            return Ok(replies::added_to_queue(&title));
        }

        match self.start_head().await {
            Ok(title) => Ok(replies::now_playing(&title)),
            Err(e) => {
                self.queue.pop_head();
                self.release_connection().await;
                Err(e)
            }
        }
    }

    pub async fn pause(&mut self) -> Result<String, CommandError> {
        self.require_connection()?;
        self.player.pause()?;
        Ok(replies::paused(&self.current_title().await))
    }

    pub async fn resume(&mut self) -> Result<String, CommandError> {
        self.require_connection()?;
        self.player.resume()?;
        Ok(replies::resumed(&self.current_title().await))
    }

    /// Drops `count` tracks from the head (at least one) and moves on.
    pub async fn next(&mut self, count: usize) -> Result<String, CommandError> {
        self.require_connection()?;

        let skipped = self.queue.skip(count.max(1));
        self.player.stop();
        self.advance().await;

        Ok(replies::skipped(skipped))
    }

    /// Clears the queue; the Idle transition then leaves the channel.
    pub async fn stop(&mut self) -> Result<String, CommandError> {
        self.require_connection()?;

        self.queue.clear();
        self.player.stop();
        self.advance().await;

        Ok(replies::stopped())
    }

    /// Current track and the titles of what follows.
    pub async fn list(&self) -> Result<String, CommandError> {
        self.require_connection()?;

        let Some(head) = self.queue.head() else {
            return Ok(replies::nothing_playing());
        };

        let upcoming: Vec<&str> = self.queue.upcoming().collect();
        let shown = upcoming.len().min(QUEUE_PREVIEW);

        let lookups = std::iter::once(head)
            .chain(upcoming[..shown].iter().copied())
            .map(|url| self.title_or_unknown(url));
        let mut titles = join_all(lookups).await;
        let current = titles.remove(0);

        Ok(replies::queue_listing(
            &current,
            self.player.state() == PlayerState::Paused,
            &titles,
            upcoming.len() - shown,
        ))
    }

    /// Natural end (or error) of the track identified by `token`.
    pub async fn on_track_end(&mut self, token: TrackToken, failure: Option<String>) {
        if !self.player.finish(token) {
            return;
        }

        let finished = self.queue.pop_head();
        match (failure, finished) {
            (Some(details), Some(url)) => {
                warn!("Error playing {} in guild {}: {}", url, self.guild_id, details);
                self.announce(&replies::playback_failed(&url, &details)).await;
            }
            _ => debug!("Track {:?} ended in guild {}", token, self.guild_id),
        }

        self.advance().await;
    }

    /// The bot was removed from `channel_id` by someone else. Ignored when
    /// the current call is still joined: the event then belongs to a
    /// connection this session already released.
    pub async fn connection_lost(&mut self, channel_id: ChannelId) {
        let Some(connection) = self.connection.clone() else {
            return;
        };
        if connection.channel_id() != channel_id || connection.is_live().await {
            debug!("Ignoring stale leave of {} in guild {}", channel_id, self.guild_id);
            return;
        }

        warn!("🔌 Lost voice connection in guild {}", self.guild_id);
        self.queue.clear();
        self.player.stop();
        self.release_connection().await;
    }

    /// Idle transition: start the head, or leave when nothing is queued.
    /// Heads that fail to load are announced and dropped.
    async fn advance(&mut self) {
        while let Some(url) = self.queue.head().map(str::to_owned) {
            match self.start_head().await {
                Ok(title) => {
                    self.announce(&replies::now_playing(&title)).await;
                    return;
                }
                Err(CommandError::NotConnected) => {
                    self.queue.clear();
                }
                Err(e) => {
                    warn!("Error starting {} in guild {}: {}", url, self.guild_id, e);
                    self.announce(&replies::playback_failed(&url, &e.to_string()))
                        .await;
                    self.queue.pop_head();
                }
            }
        }

        if self.release_connection().await {
            self.announce(&replies::disconnected()).await;
        }
    }

    /// Loads the queue head on the connection: Idle → Playing.
    async fn start_head(&mut self) -> Result<String, CommandError> {
        let connection = self.connection.clone().ok_or(CommandError::NotConnected)?;
        let url = self
            .queue
            .head()
            .ok_or(CommandError::InvalidState("Nothing to play"))?
            .to_string();

        let token = self.player.reserve_token();
        let notifier = TrackEndNotifier {
            session: self.this.clone(),
            token,
        };

        let control = connection.play(&url, notifier).await?;
        self.player.load(token, control);

        let title = self.title_or_unknown(&url).await;
        info!("🎵 Now playing in guild {}: {}", self.guild_id, title);
        Ok(title)
    }

    /// Releases the connection; returns whether there was one.
    async fn release_connection(&mut self) -> bool {
        let Some(connection) = self.connection.take() else {
            return false;
        };
        debug_assert!(!self.player.is_loaded(), "connection released with a track loaded");

        if let Err(e) = connection.disconnect().await {
            warn!("Error leaving voice in guild {}: {}", self.guild_id, e);
        }
        true
    }

    async fn resolve(&self, query: &str) -> Result<String, CommandError> {
        if self.services.resolver.validate_url(query) {
            return Ok(query.to_string());
        }

        self.bounded(self.services.resolver.resolve_by_text(query))
            .await?
            .ok_or(CommandError::NoSearchResult)
    }

    async fn current_title(&self) -> String {
        match self.queue.head() {
            Some(url) => self.title_or_unknown(url).await,
            None => replies::UNKNOWN_TITLE.to_string(),
        }
    }

    async fn title_or_unknown(&self, url: &str) -> String {
        match self.bounded(self.services.resolver.get_title(url)).await {
            Ok(title) => title,
            Err(e) => {
                warn!("Error fetching title of {}: {}", url, e);
                replies::UNKNOWN_TITLE.to_string()
            }
        }
    }

    /// Applies the resolver timeout to a lookup.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ResolverError>>,
    ) -> Result<T, ResolverError> {
        let limit = self.services.settings.resolver_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ResolverError::Timeout(limit))?
    }

    async fn announce(&self, text: &str) {
        match self.text_channel {
            Some(channel_id) => self.services.announcer.announce(channel_id, text).await,
            None => debug!("No text channel for guild {}, dropping: {}", self.guild_id, text),
        }
    }

    fn require_connection(&self) -> Result<(), CommandError> {
        match self.connection {
            Some(_) => Ok(()),
            None => Err(CommandError::NotConnected),
        }
    }
}
