//! # Bot Module
//!
//! Discord glue for Melodia.
//!
//! [`MelodiaBot`] implements Serenity's [`EventHandler`]. For every guild
//! message that starts with the configured prefix it:
//!
//! 1. parses the command ([`commands::Command`]),
//! 2. looks up the caller's voice channel in the cache,
//! 3. gets or creates the guild's session and locks it,
//! 4. runs [`handlers::dispatch`] inside that lock,
//! 5. reacts to the message and replies with the outcome.
//!
//! Track end events from songbird are handled in [`events`].

use futures::FutureExt;
use serenity::{
    all::{ChannelId, Context, EventHandler, GuildId, Message, ReactionType, Ready, UserId, VoiceState},
    async_trait,
};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tracing::{error, info, warn};

pub mod commands;
pub mod events;
pub mod handlers;

use crate::{
    config::Config,
    session::SessionStore,
    ui::{replies, Reply},
};
use commands::Command;

pub struct MelodiaBot {
    config: Arc<Config>,
    sessions: Arc<SessionStore>,
}

impl MelodiaBot {
    pub fn new(config: Arc<Config>, sessions: Arc<SessionStore>) -> Self {
        Self { config, sessions }
    }

    async fn handle_command(&self, ctx: &Context, msg: &Message, guild_id: GuildId, command: Command) -> Reply {
        let caller_channel = caller_voice_channel(ctx, guild_id, msg.author.id);
        let session = self.sessions.get_or_create(guild_id);

        let mut session = session.lock().await;
        session.set_text_channel(msg.channel_id);

        let dispatched = handlers::dispatch(command, caller_channel, &mut session, &self.config.command_prefix);

        match AssertUnwindSafe(dispatched).catch_unwind().await {
            Ok(reply) => reply,
            Err(panic) => {
                let details = panic_message(panic.as_ref());
                error!("💥 Command panicked in guild {}: {}", guild_id, details);
                Reply::failure(replies::unexpected(&details))
            }
        }
    }
}

#[async_trait]
impl EventHandler for MelodiaBot {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🤖 {} is online!", ready.user.name);
        info!("📊 Connected to {} guilds", ready.guilds.len());
        info!("🎶 {} guild sessions in memory", self.sessions.len());
        info!("💬 Listening for `{}` commands", self.config.command_prefix);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let Some(command) = Command::parse(&self.config.command_prefix, &msg.content) else {
            return;
        };

        info!("📝 Command from {} in guild {}: {:?}", msg.author.name, guild_id, command);

        let reply = self.handle_command(&ctx, &msg, guild_id, command).await;
        send_reply(&ctx, &msg, &reply).await;
    }

    /// Cleans up the session when someone else disconnects the bot.
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id || new.channel_id.is_some() {
            return;
        }

        let (Some(guild_id), Some(channel_id)) = (new.guild_id, old.and_then(|state| state.channel_id)) else {
            return;
        };

        info!("🔌 Bot left voice channel {} in guild {}", channel_id, guild_id);

        if let Some(session) = self.sessions.get(guild_id) {
            session.lock().await.connection_lost(channel_id).await;
        }
    }
}

/// Reaction and text always go out together.
async fn send_reply(ctx: &Context, msg: &Message, reply: &Reply) {
    let reaction = ReactionType::Unicode(reply.reaction().to_string());
    if let Err(e) = msg.react(&ctx.http, reaction).await {
        warn!("Error reacting to message {}: {:?}", msg.id, e);
    }

    if let Err(e) = msg.reply(&ctx.http, &reply.text).await {
        warn!("Error replying to message {}: {:?}", msg.id, e);
    }
}

fn caller_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = guild_id.to_guild_cached(&ctx.cache)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "something went wrong".to_string()
    }
}
