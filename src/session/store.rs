use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tracing::debug;

use super::{Services, Session, SharedSession};

/// Guild → session registry. Sessions are created on first use and kept
/// for the lifetime of the process.
pub struct SessionStore {
    sessions: DashMap<GuildId, SharedSession>,
    services: Arc<Services>,
}

impl SessionStore {
    pub fn new(services: Services) -> Self {
        Self {
            sessions: DashMap::new(),
            services: Arc::new(services),
        }
    }

    pub fn get_or_create(&self, guild_id: GuildId) -> SharedSession {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                debug!("🆕 New session for guild {}", guild_id);
                Session::shared(guild_id, self.services.clone())
            })
            .clone()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<SharedSession> {
        self.sessions.get(&guild_id).map(|session| session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
