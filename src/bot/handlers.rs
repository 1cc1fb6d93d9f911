use serenity::model::id::ChannelId;
use tracing::{info, warn};

use crate::{
    bot::commands::Command,
    error::CommandError,
    session::Session,
    ui::{replies, Reply},
};

/// Runs `command` against the guild's session. Every failure is turned into
/// a failure reply here; nothing propagates past this point.
pub async fn dispatch(
    command: Command,
    caller_channel: Option<ChannelId>,
    session: &mut Session,
    prefix: &str,
) -> Reply {
    info!("📝 {:?} in guild {}", command, session.guild_id());

    let result = match command {
        Command::Play(query) => session.play(&query, caller_channel).await,
        Command::Pause => session.pause().await,
        Command::Resume => session.resume().await,
        Command::Next(count) => session.next(count).await,
        Command::Stop => session.stop().await,
        Command::Queue => session.list().await,
        Command::Help => Ok(replies::help(prefix)),
        Command::Unknown(word) => {
            let error = CommandError::UnknownCommand(word);
            return Reply::failure(replies::unknown_command(prefix, &error));
        }
    };

    if let Err(e) = &result {
        warn!("Command failed in guild {}: {:?}", session.guild_id(), e);
    }

    Reply::from(result)
}
