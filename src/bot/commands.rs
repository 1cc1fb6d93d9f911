/// A prefix command, parsed from a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(String),
    Pause,
    Resume,
    Next(usize),
    Stop,
    Queue,
    Help,
    Unknown(String),
}

impl Command {
    /// Parses `content` if it starts with `prefix`. The command word is
    /// case-insensitive; everything after it is the argument, with runs of
    /// whitespace collapsed.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?;

        let mut words = rest.split_whitespace();
        let word = words.next().unwrap_or_default().to_lowercase();
        let argument = words.collect::<Vec<_>>().join(" ");

        let command = match word.as_str() {
            "" | "help" => Self::Help,
            "play" => Self::Play(argument),
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "next" => Self::Next(parse_count(&argument)),
            "stop" => Self::Stop,
            "queue" => Self::Queue,
            _ => Self::Unknown(word),
        };

        Some(command)
    }
}

/// `next` count: anything that is not a positive integer means 1.
fn parse_count(argument: &str) -> usize {
    argument
        .parse::<usize>()
        .ok()
        .filter(|count| *count > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PREFIX: &str = "/melodia";

    #[test]
    fn ignores_messages_without_prefix() {
        assert_eq!(Command::parse(PREFIX, "play something"), None);
        assert_eq!(Command::parse(PREFIX, "hey /melodia play"), None);
    }

    #[test]
    fn command_word_is_case_insensitive() {
        assert_eq!(Command::parse(PREFIX, "/melodia PAUSE"), Some(Command::Pause));
        assert_eq!(Command::parse(PREFIX, "/melodia Resume"), Some(Command::Resume));
        assert_eq!(Command::parse(PREFIX, "/melodia stop"), Some(Command::Stop));
        assert_eq!(Command::parse(PREFIX, "/melodia queue"), Some(Command::Queue));
    }

    #[test]
    fn play_keeps_the_whole_argument() {
        assert_eq!(
            Command::parse(PREFIX, "/melodia play   never  gonna give you up "),
            Some(Command::Play("never gonna give you up".into()))
        );
        assert_eq!(
            Command::parse(PREFIX, "/melodia play https://youtu.be/dQw4w9WgXcQ"),
            Some(Command::Play("https://youtu.be/dQw4w9WgXcQ".into()))
        );
        assert_eq!(Command::parse(PREFIX, "/melodia play"), Some(Command::Play(String::new())));
    }

    #[test]
    fn next_count_defaults_to_one() {
        assert_eq!(Command::parse(PREFIX, "/melodia next"), Some(Command::Next(1)));
        assert_eq!(Command::parse(PREFIX, "/melodia next 3"), Some(Command::Next(3)));
        assert_eq!(Command::parse(PREFIX, "/melodia next 0"), Some(Command::Next(1)));
        assert_eq!(Command::parse(PREFIX, "/melodia next -2"), Some(Command::Next(1)));
        assert_eq!(Command::parse(PREFIX, "/melodia next lots"), Some(Command::Next(1)));
    }

    #[test]
    fn bare_prefix_is_help_and_unknown_words_are_kept() {
        assert_eq!(Command::parse(PREFIX, "/melodia"), Some(Command::Help));
        assert_eq!(Command::parse(PREFIX, "/melodia help"), Some(Command::Help));
        assert_eq!(
            Command::parse(PREFIX, "/melodia Shuffle now"),
            Some(Command::Unknown("shuffle".into()))
        );
    }
}
