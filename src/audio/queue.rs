use std::collections::VecDeque;
use tracing::{debug, info};

use crate::error::CommandError;

/// FIFO of track URLs. The head is the track that is playing (or about to).
#[derive(Debug)]
pub struct TrackQueue {
    items: VecDeque<String>,
    max_size: usize,
}

impl TrackQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
        }
    }

    /// Appends a track at the tail.
    pub fn push(&mut self, url: String) -> Result<(), CommandError> {
        if self.items.len() >= self.max_size {
            return Err(CommandError::QueueFull(self.max_size));
        }

        info!("➕ Queued: {}", url);
        self.items.push_back(url);
        Ok(())
    }

    pub fn head(&self) -> Option<&str> {
        self.items.front().map(String::as_str)
    }

    /// Drops the head and returns it.
    pub fn pop_head(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// Removes up to `count` entries from the head; returns how many went.
    pub fn skip(&mut self, count: usize) -> usize {
        let skipped = count.min(self.items.len());
        self.items.drain(..skipped);
        debug!("⏭️ Skipped {} of {} requested", skipped, count);
        skipped
    }

    pub fn clear(&mut self) {
        self.items.clear();
        info!("🗑️ Queue cleared");
    }

    /// Everything after the head, in play order.
    pub fn upcoming(&self) -> impl Iterator<Item = &str> {
        self.items.iter().skip(1).map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}
