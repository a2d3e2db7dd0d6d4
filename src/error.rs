#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("YouTube API error: {0}")]
    YouTubeApi(String),

    #[error("Google Calendar API error: {0}")]
    CalendarApi(String),
}

pub type AppResult<T> = Result<T, AppError>;
