use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::sync::CalendarStore;

const GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Client for the Google Calendar API (OAuth bearer auth).
#[derive(Debug, Clone)]
pub struct GoogleCalendarService {
    client: Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    access_token: Arc<RwLock<Option<AccessToken>>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

// ============================================================================
// Event Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Assigned by the calendar on insert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Absent for all-day events, which carry a plain date instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl GoogleCalendarService {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            client_id: config.calendar.client_id.clone(),
            client_secret: config.calendar.client_secret.clone(),
            refresh_token: config.calendar.refresh_token.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Exchange the long-lived refresh token for a short-lived access token
    /// and cache it with its expiry.
    async fn refresh_access_token(&self) -> AppResult<String> {
        let response = self
            .client
            .post(GOOGLE_OAUTH_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CalendarApi(format!(
                "Failed to refresh access token: {}",
                error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);

        let mut guard = self.access_token.write().await;
        *guard = Some(AccessToken {
            token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    /// Return a token valid for at least the refresh margin, fetching a new
    /// one when the cached token is missing or about to expire.
    async fn access_token(&self) -> AppResult<String> {
        const REFRESH_MARGIN_SECS: i64 = 60;

        {
            let guard = self.access_token.read().await;
            if let Some(ref token) = *guard {
                if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now() {
                    return Ok(token.token.clone());
                }
            }
        }

        self.refresh_access_token().await
    }
}

#[async_trait]
impl CalendarStore for GoogleCalendarService {
    /// List events overlapping `[time_min, time_max]`, in calendar order.
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}/calendars/{}/events", CALENDAR_API_URL, calendar_id))
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CalendarApi(format!(
                "Failed to list events: {}",
                error_text
            )));
        }

        let events: EventsResponse = response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse events response: {}", e)))?;

        Ok(events.items)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(format!("{}/calendars/{}/events", CALENDAR_API_URL, calendar_id))
            .header("Authorization", format!("Bearer {}", token))
            .json(event)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CalendarApi(format!(
                "Failed to insert event: {}",
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse insert response: {}", e)))
    }

    /// Full-content replacement of the event stored at `event_id`.
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent> {
        let token = self.access_token().await?;

        let response = self
            .client
            .put(format!(
                "{}/calendars/{}/events/{}",
                CALENDAR_API_URL, calendar_id, event_id
            ))
            .header("Authorization", format!("Bearer {}", token))
            .json(event)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::CalendarApi(format!(
                "Failed to update event {}: {}",
                event_id, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse update response: {}", e)))
    }
}
