use async_trait::async_trait;
use regex::Regex;
use reqwest::Response;
use serde::Deserialize;
use songbird::input::{Input, YoutubeDl};
use std::{sync::LazyLock, time::Duration};
use tracing::{debug, error, info};
use url::Url;

use super::{ResolverError, TrackResolver};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Hosts where the video id travels in the `v` query parameter (or in an
/// `/embed/`, `/v/`, `/shorts/` or `/live/` path).
const QUERY_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

/// YouTube Data API v3 client plus the yt-dlp backed audio opener.
pub struct YouTubeResolver {
    api_key: String,
    /// Metadata calls, bounded by the resolver timeout.
    client: reqwest::Client,
    /// Audio streaming; unbounded because a whole song flows through it.
    audio_client: reqwest::Client,
}

impl YouTubeResolver {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            client,
            audio_client: reqwest::Client::new(),
        })
    }

    /// Canonical watch URL for a video id.
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    /// Extracts the 11-character video id from any supported YouTube URL.
    pub fn extract_video_id(candidate: &str) -> Option<String> {
        let parsed = Url::parse(candidate.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let host = parsed.host_str()?.to_ascii_lowercase();
        let id = if QUERY_HOSTS.contains(&host.as_str()) {
            match parsed.query_pairs().find(|(key, _)| key == "v") {
                Some((_, value)) => value.into_owned(),
                None => {
                    let mut segments = parsed.path_segments()?;
                    match segments.next()? {
                        "embed" | "v" | "shorts" | "live" => segments.next()?.to_string(),
                        _ => return None,
                    }
                }
            }
        } else if host == "youtu.be" {
            parsed.path_segments()?.next()?.to_string()
        } else {
            return None;
        };

        VIDEO_ID.is_match(&id).then_some(id)
    }

    /// Lazily opens the audio of `url` for songbird. Nothing is fetched until
    /// the driver starts reading, so failures surface as track errors.
    pub fn open_audio_stream(&self, url: &str) -> Input {
        info!("🎵 Opening audio stream: {}", url);
        YoutubeDl::new(self.audio_client.clone(), url.to_string()).into()
    }

    async fn check_status(response: Response) -> Result<Response, ResolverError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("❌ YouTube API error: {} - {}", status, body);
        Err(ResolverError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TrackResolver for YouTubeResolver {
    fn validate_url(&self, candidate: &str) -> bool {
        Self::extract_video_id(candidate).is_some()
    }

    async fn resolve_by_text(&self, query: &str) -> Result<Option<String>, ResolverError> {
        debug!("🔍 YouTube search: {}", query);

        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("maxResults", "1"),
                ("q", query),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let results: SearchResponse = Self::check_status(response).await?.json().await?;
        let url = first_video_url(results);

        match &url {
            Some(url) => info!("✅ Search for {:?} resolved to {}", query, url),
            None => info!("📭 No results for {:?}", query),
        }

        Ok(url)
    }

    async fn get_title(&self, url: &str) -> Result<String, ResolverError> {
        let video_id = Self::extract_video_id(url)
            .ok_or_else(|| ResolverError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(VIDEOS_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("id", video_id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let details: VideosResponse = Self::check_status(response).await?.json().await?;

        details
            .items
            .into_iter()
            .next()
            .map(|video| video.snippet.title)
            .ok_or_else(|| ResolverError::NotFound(url.to_string()))
    }
}

fn first_video_url(results: SearchResponse) -> Option<String> {
    results
        .items
        .into_iter()
        .find_map(|item| item.id.video_id)
        .map(|id| YouTubeResolver::watch_url(&id))
}
