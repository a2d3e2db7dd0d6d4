use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::sync::BroadcastSource;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the YouTube Data API (API-key auth).
#[derive(Debug, Clone)]
pub struct YouTubeService {
    client: Client,
    api_key: String,
}

// ============================================================================
// Search Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Video Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: Snippet,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub scheduled_start_time: Option<DateTime<Utc>>,
}

// ============================================================================
// Broadcast Types
// ============================================================================

/// One entry from the channel's upcoming-broadcast listing.
#[derive(Debug, Clone)]
pub struct UpcomingBroadcast {
    pub video_id: String,
    pub title: String,
}

/// Full record for one scheduled broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub scheduled_start: DateTime<Utc>,
}

impl YouTubeService {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key: config.youtube.api_key.clone(),
        })
    }
}

#[async_trait]
impl BroadcastSource for YouTubeService {
    /// List the channel's upcoming live broadcasts (single page).
    async fn list_upcoming(&self, channel_id: &str) -> AppResult<Vec<UpcomingBroadcast>> {
        let response = self
            .client
            .get(format!("{}/search", YOUTUBE_API_URL))
            .query(&[
                ("part", "snippet,id"),
                ("channelId", channel_id),
                ("eventType", "upcoming"),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", "50"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::YouTubeApi(format!(
                "Failed to search upcoming broadcasts: {}",
                error_text
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("Failed to parse search response: {}", e)))?;

        Ok(search
            .items
            .into_iter()
            .map(|item| UpcomingBroadcast {
                video_id: item.id.video_id,
                title: item.snippet.title,
            })
            .collect())
    }

    /// Fetch the full record for one broadcast. Returns `None` when the video
    /// has no scheduled start time (not a live broadcast, or not scheduled yet).
    async fn broadcast_detail(&self, video_id: &str) -> AppResult<Option<BroadcastDetail>> {
        let response = self
            .client
            .get(format!("{}/videos", YOUTUBE_API_URL))
            .query(&[
                ("part", "snippet,liveStreamingDetails"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::YouTubeApi(format!(
                "Failed to get video detail: {}",
                error_text
            )));
        }

        let videos: VideoListResponse = response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("Failed to parse video response: {}", e)))?;

        let video = videos
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::YouTubeApi(format!("Video {} not found", video_id)))?;

        let scheduled_start = video
            .live_streaming_details
            .and_then(|details| details.scheduled_start_time);

        Ok(scheduled_start.map(|scheduled_start| BroadcastDetail {
            id: video.id,
            title: video.snippet.title,
            description: video.snippet.description,
            scheduled_start,
        }))
    }
}
