//! Text of every message Melodia sends.

use crate::error::CommandError;

pub const SUCCESS_REACTION: &str = "👌";
pub const FAILURE_REACTION: &str = "😓";

/// Shown when a title lookup fails; playback and listings carry on.
pub const UNKNOWN_TITLE: &str = "unknown title";

/// Discord rejects messages over 2000 characters; leave room for the tail.
const MESSAGE_BUDGET: usize = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// A reaction marker paired with the reply text. One is never sent without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outcome: Outcome,
    pub text: String,
}

impl Reply {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            text: text.into(),
        }
    }

    pub fn reaction(&self) -> &'static str {
        match self.outcome {
            Outcome::Success => SUCCESS_REACTION,
            Outcome::Failure => FAILURE_REACTION,
        }
    }
}

impl From<Result<String, CommandError>> for Reply {
    fn from(result: Result<String, CommandError>) -> Self {
        match result {
            Ok(text) => Self::success(text),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

pub fn now_playing(title: &str) -> String {
    format!("Now playing \"{}\"", title)
}

pub fn added_to_queue(title: &str) -> String {
    format!("Added \"{}\" to queue", title)
}

pub fn paused(title: &str) -> String {
    format!("Paused \"{}\"", title)
}

pub fn resumed(title: &str) -> String {
    format!("Resumed \"{}\"", title)
}

pub fn skipped(count: usize) -> String {
    match count {
        1 => "Skipped 1 track".to_string(),
        n => format!("Skipped {} tracks", n),
    }
}

pub fn stopped() -> String {
    "Stopped playback and cleared the queue".to_string()
}

pub fn disconnected() -> String {
    "Disconnected, the queue is empty".to_string()
}

pub fn playback_failed(url: &str, details: &str) -> String {
    format!("Uh oh! Couldn't play {}: {}", url, details)
}

pub fn nothing_playing() -> String {
    "Nothing is playing right now".to_string()
}

pub fn unexpected(details: &str) -> String {
    format!("Uh oh! {}", details)
}

pub fn unknown_command(prefix: &str, error: &CommandError) -> String {
    format!("{}. Try `{} help`", error, prefix)
}

/// Current track plus a 1-indexed listing of what follows. `hidden` counts
/// upcoming tracks that were not looked up at all.
pub fn queue_listing(current: &str, paused: bool, upcoming: &[String], hidden: usize) -> String {
    let label = if paused { "Paused" } else { "Now playing" };
    let mut text = format!("{}: \"{}\"", label, current);

    if upcoming.is_empty() && hidden == 0 {
        text.push_str("\nNothing else is queued");
        return text;
    }

    text.push_str("\nUp next:");
    let mut remaining = hidden;
    for (index, title) in upcoming.iter().enumerate() {
        let line = format!("\n{}. \"{}\"", index + 1, title);
        if text.len() + line.len() > MESSAGE_BUDGET {
            remaining += upcoming.len() - index;
            break;
        }
        text.push_str(&line);
    }

    if remaining > 0 {
        text.push_str(&format!("\n…and {} more", remaining));
    }

    text
}

pub fn help(prefix: &str) -> String {
    let commands = [
        ("play <song or YouTube link>", "play a track, or queue it if something is playing"),
        ("pause", "pause the current track"),
        ("resume", "resume a paused track"),
        ("next [count]", "skip the current track (or `count` tracks)"),
        ("stop", "clear the queue and leave the voice channel"),
        ("queue", "show what's playing and what's next"),
        ("help", "show this message"),
    ];

    let mut text = String::from("**Melodia commands**");
    for (usage, description) in commands {
        text.push_str(&format!("\n`{} {}`: {}", prefix, usage, description));
    }
    text
}
