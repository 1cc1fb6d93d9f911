use thiserror::Error;

use crate::{audio::voice::VoiceError, sources::ResolverError};

/// Everything a command can fail with. The `Display` text is what the user
/// sees in the reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Please join a voice channel before calling this command")]
    NotInVoiceChannel,

    #[error("Tell me what to play, e.g. a YouTube link or a song name")]
    MissingQuery,

    #[error("Can't find what you're looking for")]
    NoSearchResult,

    #[error("Uh oh! {0}")]
    Resolver(#[from] ResolverError),

    #[error("I'm not in a voice channel right now")]
    NotConnected,

    /// Soft failure, e.g. pausing while already paused.
    #[error("{0}")]
    InvalidState(&'static str),

    #[error("The queue is full ({0} tracks)")]
    QueueFull(usize),

    #[error("Uh oh! {0}")]
    Voice(#[from] VoiceError),

    #[error("Unknown command `{0}`")]
    UnknownCommand(String),
}
