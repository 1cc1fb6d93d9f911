use async_trait::async_trait;
use serenity::{http::Http, model::id::ChannelId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends messages that are not replies to a command, e.g. "now playing"
/// after a track ends on its own.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Best effort: failures are logged, never returned.
    async fn announce(&self, channel_id: ChannelId, text: &str);
}

pub struct ChannelAnnouncer {
    http: Arc<Http>,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Announcer for ChannelAnnouncer {
    async fn announce(&self, channel_id: ChannelId, text: &str) {
        debug!("📣 {} <- {}", channel_id, text);

        if let Err(e) = channel_id.say(&self.http, text).await {
            warn!("Error sending message to channel {}: {:?}", channel_id, e);
        }
    }
}
