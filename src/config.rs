use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub youtube: YouTubeConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// IANA time zone attached to the events written to the calendar.
    /// Read from env var `YLC_TIME_ZONE`.
    pub time_zone: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            youtube: YouTubeConfig {
                api_key: env::var("YLC_API_KEY")
                    .map_err(|_| ConfigError::MissingEnv("YLC_API_KEY".to_string()))?,
                channel_id: env::var("YLC_CHANNEL_ID")
                    .map_err(|_| ConfigError::MissingEnv("YLC_CHANNEL_ID".to_string()))?,
            },
            calendar: CalendarConfig {
                calendar_id: env::var("YLC_CALENDAR_ID")
                    .map_err(|_| ConfigError::MissingEnv("YLC_CALENDAR_ID".to_string()))?,
                client_id: env::var("YLC_GOOGLE_CLIENT_ID")
                    .map_err(|_| ConfigError::MissingEnv("YLC_GOOGLE_CLIENT_ID".to_string()))?,
                client_secret: env::var("YLC_GOOGLE_CLIENT_SECRET")
                    .map_err(|_| ConfigError::MissingEnv("YLC_GOOGLE_CLIENT_SECRET".to_string()))?,
                refresh_token: env::var("YLC_GOOGLE_REFRESH_TOKEN")
                    .map_err(|_| ConfigError::MissingEnv("YLC_GOOGLE_REFRESH_TOKEN".to_string()))?,
                time_zone: env::var("YLC_TIME_ZONE")
                    .unwrap_or_else(|_| "Europe/London".to_string()),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
}
