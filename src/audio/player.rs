use tracing::{debug, info, warn};

use crate::{audio::voice::VoiceError, error::CommandError};

/// Playback state of a guild's player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
}

/// Identifies one loaded track. End notifications carry the token of the
/// track they belong to so late events for a replaced track can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackToken(u64);

/// Control surface of a track that is playing on a voice connection.
pub trait TrackControl: Send + Sync {
    fn pause(&self) -> Result<(), VoiceError>;
    fn resume(&self) -> Result<(), VoiceError>;
    fn stop(&self) -> Result<(), VoiceError>;
}

struct LoadedTrack {
    token: TrackToken,
    control: Box<dyn TrackControl>,
}

/// Idle / Playing / Paused state machine wrapped around the current track.
pub struct AudioPlayer {
    state: PlayerState,
    current: Option<LoadedTrack>,
    next_token: u64,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            current: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether a track is loaded (Playing or Paused).
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Hands out the token for the next track to load.
    pub fn reserve_token(&mut self) -> TrackToken {
        self.next_token += 1;
        TrackToken(self.next_token)
    }

    /// Idle → Playing with a freshly started track.
    pub fn load(&mut self, token: TrackToken, control: Box<dyn TrackControl>) {
        if self.current.is_some() {
            self.stop();
        }

        self.current = Some(LoadedTrack { token, control });
        self.state = PlayerState::Playing;
        debug!("Player loaded track {:?}", token);
    }

    /// Playing → Paused.
    pub fn pause(&mut self) -> Result<(), CommandError> {
        match (&self.current, self.state) {
            (Some(track), PlayerState::Playing) => {
                track.control.pause()?;
                self.state = PlayerState::Paused;
                info!("⏸️ Playback paused");
                Ok(())
            }
            _ => Err(CommandError::InvalidState("Already paused")),
        }
    }

    /// Paused → Playing.
    pub fn resume(&mut self) -> Result<(), CommandError> {
        match (&self.current, self.state) {
            (Some(track), PlayerState::Paused) => {
                track.control.resume()?;
                self.state = PlayerState::Playing;
                info!("▶️ Playback resumed");
                Ok(())
            }
            _ => Err(CommandError::InvalidState("Already playing")),
        }
    }

    /// Forced Playing|Paused → Idle. Returns whether a track was unloaded.
    pub fn stop(&mut self) -> bool {
        self.state = PlayerState::Idle;

        match self.current.take() {
            Some(track) => {
                if let Err(e) = track.control.stop() {
                    warn!("Error stopping track {:?}: {}", track.token, e);
                }
                true
            }
            None => false,
        }
    }

    /// Natural end of `token`. Returns false (and changes nothing) when the
    /// token is not the loaded track.
    pub fn finish(&mut self, token: TrackToken) -> bool {
        match &self.current {
            Some(track) if track.token == token => {
                self.current = None;
                self.state = PlayerState::Idle;
                true
            }
            _ => {
                debug!("Ignoring end of stale track {:?}", token);
                false
            }
        }
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTrack;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_idle() {
        let player = AudioPlayer::new();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.is_loaded());
    }

    #[test]
    fn pause_and_resume_follow_the_state_machine() {
        let mut player = AudioPlayer::new();
        let (track, log) = FakeTrack::new();
        let token = player.reserve_token();
        player.load(token, Box::new(track));
        assert_eq!(player.state(), PlayerState::Playing);

        player.pause().unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        assert!(matches!(player.pause(), Err(CommandError::InvalidState(_))));

        player.resume().unwrap();
        assert_eq!(player.state(), PlayerState::Playing);
        assert!(matches!(player.resume(), Err(CommandError::InvalidState(_))));

        assert_eq!(log.calls(), vec!["pause", "resume"]);
    }

    #[test]
    fn pause_when_idle_is_invalid() {
        let mut player = AudioPlayer::new();
        assert!(matches!(player.pause(), Err(CommandError::InvalidState("Already paused"))));
        assert!(matches!(player.resume(), Err(CommandError::InvalidState("Already playing"))));
    }

    #[test]
    fn failed_control_keeps_state() {
        let mut player = AudioPlayer::new();
        let (track, _log) = FakeTrack::failing();
        let token = player.reserve_token();
        player.load(token, Box::new(track));

        assert!(matches!(player.pause(), Err(CommandError::Voice(_))));
        assert_eq!(player.state(), PlayerState::Playing);
    }

    #[test]
    fn stop_unloads_the_track() {
        let mut player = AudioPlayer::new();
        let (track, log) = FakeTrack::new();
        let token = player.reserve_token();
        player.load(token, Box::new(track));
        player.pause().unwrap();

        assert!(player.stop());
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.is_loaded());
        assert!(!player.stop());
        assert_eq!(log.calls(), vec!["pause", "stop"]);
    }

    #[test]
    fn finish_ignores_stale_tokens() {
        let mut player = AudioPlayer::new();
        let (first, _) = FakeTrack::new();
        let stale = player.reserve_token();
        player.load(stale, Box::new(first));
        player.stop();

        let (second, _) = FakeTrack::new();
        let current = player.reserve_token();
        player.load(current, Box::new(second));

        assert!(!player.finish(stale));
        assert_eq!(player.state(), PlayerState::Playing);

        assert!(player.finish(current));
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.finish(current));
    }
}
