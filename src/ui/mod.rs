//! # UI Module
//!
//! Everything user-facing: reply texts with their reaction markers
//! ([`replies`]) and unsolicited channel announcements ([`announcer`]).

pub mod announcer;
pub mod replies;

pub use announcer::{Announcer, ChannelAnnouncer};
pub use replies::{Outcome, Reply};
