use serenity::{async_trait, model::id::GuildId};
use songbird::{
    tracks::PlayMode, Event as VoiceEvent, EventContext, EventHandler as VoiceEventHandler,
};
use tracing::{debug, error};

use crate::session::TrackEndNotifier;

/// Handler for the end (or failure) of a track started by a session.
///
/// Registered on the track for both `TrackEvent::End` and
/// `TrackEvent::Error`; the session's token check keeps it to one advance.
pub struct TrackEndHandler {
    guild_id: GuildId,
    notifier: TrackEndNotifier,
}

impl TrackEndHandler {
    pub fn new(guild_id: GuildId, notifier: TrackEndNotifier) -> Self {
        Self { guild_id, notifier }
    }
}

#[async_trait]
impl VoiceEventHandler for TrackEndHandler {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<VoiceEvent> {
        let mut failure = None;

        if let EventContext::Track(track_list) = ctx {
            for (state, _handle) in *track_list {
                if let PlayMode::Errored(e) = &state.playing {
                    error!(
                        "❌ Track {:?} failed in guild {}: {:?}",
                        self.notifier.token(),
                        self.guild_id,
                        e
                    );
                    failure = Some(e.to_string());
                } else {
                    debug!(
                        "🎵 Track {:?} ended in guild {}: {:?}",
                        self.notifier.token(),
                        self.guild_id,
                        state.playing
                    );
                }
            }
        }

        // Off the voice event loop: the session lock may be held by a command.
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            notifier.notify(failure).await;
        });

        None
    }
}
