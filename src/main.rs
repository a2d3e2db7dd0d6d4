use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod services;

use config::Config;
use services::google_calendar::GoogleCalendarService;
use services::sync::CalendarSync;
use services::youtube::YouTubeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "youtube_live_calendar=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting YouTube live calendar sync");

    let youtube = YouTubeService::new(&config)?;
    let calendar = GoogleCalendarService::new(&config)?;

    let sync = CalendarSync::new(youtube, calendar, &config);
    let events = sync.sync_channel().await?;

    for event in &events {
        match event.html_link.as_deref() {
            Some(link) => println!("Calendar entry for \"{}\": {}", event.summary, link),
            None => println!("Calendar entry for \"{}\"", event.summary),
        }
    }

    tracing::info!("Sync complete: {} events reconciled", events.len());

    Ok(())
}
