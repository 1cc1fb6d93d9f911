use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_PREFIX: &str = "/melodia";
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1000;

/// Runtime configuration, read from the environment (and `.env`).
///
/// | Variable           | Required | Default    |
/// |--------------------|----------|------------|
/// | `DISCORD_TOKEN`    | yes      |            |
/// | `YOUTUBE_API_KEY`  | yes      |            |
/// | `COMMAND_PREFIX`   | no       | `/melodia` |
/// | `RESOLVER_TIMEOUT` | no       | `10s`      |
/// | `MAX_QUEUE_SIZE`   | no       | `1000`     |
///
/// No `Debug` derive: the token and API key must never end up in logs.
/// Use [`Config::summary`] instead.
#[derive(Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub command_prefix: String,

    // YouTube
    pub youtube_api_key: String,
    pub resolver_timeout: Duration,

    // Limits
    pub max_queue_size: usize,
}

impl Config {
    /// Loads `.env` if present, reads the process environment and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or blank, when a value
    /// cannot be parsed, or when [`Config::validate`] rejects it.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Builds the configuration from any key lookup; blank values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let resolver_timeout = match get("RESOLVER_TIMEOUT") {
            Some(value) => humantime::parse_duration(value.trim())
                .with_context(|| format!("RESOLVER_TIMEOUT is not a duration: {value:?}"))?,
            None => DEFAULT_RESOLVER_TIMEOUT,
        };

        let max_queue_size = match get("MAX_QUEUE_SIZE") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("MAX_QUEUE_SIZE is not a number: {value:?}"))?,
            None => DEFAULT_MAX_QUEUE_SIZE,
        };

        Ok(Self {
            discord_token: get("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?,
            command_prefix: get("COMMAND_PREFIX")
                .map(|prefix| prefix.trim().to_string())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            youtube_api_key: get("YOUTUBE_API_KEY").context("YOUTUBE_API_KEY is not set")?,
            resolver_timeout,
            max_queue_size,
        })
    }

    /// Sanity checks that would otherwise surface as confusing runtime
    /// behavior.
    ///
    /// # Validation Rules
    ///
    /// - The prefix must be a single word, since commands are split on
    ///   whitespace after it
    /// - The resolver timeout must be greater than zero
    /// - The queue must hold at least one track
    pub fn validate(&self) -> Result<()> {
        if self.command_prefix.chars().any(char::is_whitespace) {
            anyhow::bail!(
                "Command prefix cannot contain whitespace, got: {:?}",
                self.command_prefix
            );
        }

        if self.resolver_timeout.is_zero() {
            anyhow::bail!("Resolver timeout must be greater than 0");
        }

        if self.max_queue_size == 0 {
            anyhow::bail!("Max queue size must be greater than 0");
        }

        Ok(())
    }

    /// Returns a summary of the configuration for logging, without secrets.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Prefix: {}\n  \
            Resolver timeout: {}\n  \
            Limits: {} queue",
            self.command_prefix,
            humantime::format_duration(self.resolver_timeout),
            self.max_queue_size,
        )
    }
}
