//! # Sources Module
//!
//! Track resolution for Melodia.
//!
//! A [`TrackResolver`] turns whatever the user typed after `play` into a
//! playable track URL and looks up display metadata for queued URLs. The
//! session core only ever talks to the trait; [`youtube::YouTubeResolver`]
//! is the production implementation backed by the YouTube Data API v3.

pub mod youtube;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use youtube::YouTubeResolver;

/// Failures while resolving a query or fetching track metadata.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Transport-level failure talking to the search API.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status (quota, bad key, ...).
    #[error("search API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The call did not complete within the configured bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The URL does not point at a single track.
    #[error("not a track URL: {0}")]
    InvalidUrl(String),

    /// The API knows nothing about this track.
    #[error("no metadata found for {0}")]
    NotFound(String),
}

/// Turns user queries into track URLs and track URLs into titles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Whether `candidate` is already a recognised track URL.
    fn validate_url(&self, candidate: &str) -> bool;

    /// Searches by free text and returns the URL of the first hit, if any.
    async fn resolve_by_text(&self, query: &str) -> Result<Option<String>, ResolverError>;

    /// Human-readable title for a track URL.
    async fn get_title(&self, url: &str) -> Result<String, ResolverError>;
}
