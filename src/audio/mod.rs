//! # Audio Module
//!
//! Playback building blocks for a guild session.
//!
//! ### [`player`] - Audio Player
//! - Idle / Playing / Paused state machine
//! - Tokens that tell the loaded track apart from stale end events
//!
//! ### [`queue`] - Queue Management
//! - FIFO of track URLs; the head is the track being played
//! - Bounded by `MAX_QUEUE_SIZE`
//!
//! ### [`voice`] - Voice Connections
//! - Songbird-backed join, play and leave
//! - Track end and error events wired back to the session

pub mod player;
pub mod queue;
pub mod voice;
