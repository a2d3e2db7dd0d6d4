use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::google_calendar::{CalendarEvent, EventDateTime};
use crate::services::youtube::{BroadcastDetail, UpcomingBroadcast};

/// Prefix of the watch link written into every event description. The video
/// id embedded after `v=` is what ties a calendar event back to its broadcast.
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Upstream contract: a channel's scheduled live broadcasts.
#[async_trait]
pub trait BroadcastSource: Send + Sync {
    async fn list_upcoming(&self, channel_id: &str) -> AppResult<Vec<UpcomingBroadcast>>;

    async fn broadcast_detail(&self, video_id: &str) -> AppResult<Option<BroadcastDetail>>;
}

/// Downstream contract: a time-indexed calendar store.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent>;
}

/// Reconciles a channel's upcoming broadcasts into calendar events, one
/// broadcast at a time.
pub struct CalendarSync<S, C> {
    source: S,
    store: C,
    channel_id: String,
    calendar_id: String,
    time_zone: String,
}

impl<S: BroadcastSource, C: CalendarStore> CalendarSync<S, C> {
    pub fn new(source: S, store: C, config: &Config) -> Self {
        Self {
            source,
            store,
            channel_id: config.youtube.channel_id.clone(),
            calendar_id: config.calendar.calendar_id.clone(),
            time_zone: config.calendar.time_zone.clone(),
        }
    }

    /// Run one pass over the channel's upcoming broadcasts. Failures are
    /// local to one broadcast: the loop logs them and moves on to the next.
    pub async fn sync_channel(&self) -> AppResult<Vec<CalendarEvent>> {
        let broadcasts = self.source.list_upcoming(&self.channel_id).await?;
        info!(
            "Found {} upcoming broadcasts for channel {}",
            broadcasts.len(),
            self.channel_id
        );

        let mut synced = Vec::new();
        for broadcast in broadcasts {
            let detail = match self.source.broadcast_detail(&broadcast.video_id).await {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    warn!(
                        "Broadcast \"{}\" ({}) has no scheduled start time; skipping",
                        broadcast.title, broadcast.video_id
                    );
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Failed to fetch detail for broadcast {}: {:?}",
                        broadcast.video_id, e
                    );
                    continue;
                }
            };

            info!(
                "Broadcast \"{}\" scheduled at {}",
                detail.title, detail.scheduled_start
            );

            match self.reconcile(&detail).await {
                Ok(event) => synced.push(event),
                Err(e) => warn!("Failed to reconcile broadcast {}: {:?}", detail.id, e),
            }
        }

        Ok(synced)
    }

    /// Ensure exactly one calendar event exists for this broadcast: update
    /// the event already carrying its id when one sits in the broadcast's
    /// time window, insert a new one otherwise.
    pub async fn reconcile(&self, detail: &BroadcastDetail) -> AppResult<CalendarEvent> {
        let window_start = detail.scheduled_start;
        let window_end = broadcast_end(window_start);

        let candidates = self
            .store
            .list_events(&self.calendar_id, window_start, window_end)
            .await?;

        let event = self.event_for(detail);

        // The window is only a coarse pre-filter: unrelated broadcasts close
        // together in time all show up as candidates. The first one carrying
        // the broadcast id decides between update and insert.
        match candidates
            .iter()
            .find(|candidate| matches_broadcast(candidate, &detail.id))
        {
            Some(existing) => {
                let event_id = existing.id.as_deref().ok_or_else(|| {
                    AppError::CalendarApi(format!(
                        "Event matching broadcast {} has no id",
                        detail.id
                    ))
                })?;
                self.store
                    .update_event(&self.calendar_id, event_id, &event)
                    .await
            }
            None => self.store.insert_event(&self.calendar_id, &event).await,
        }
    }

    /// Target event content for a broadcast.
    fn event_for(&self, detail: &BroadcastDetail) -> CalendarEvent {
        CalendarEvent {
            id: None,
            summary: detail.title.clone(),
            description: format!(
                "Watch live here: {}{}\n\n{}",
                WATCH_URL, detail.id, detail.description
            ),
            start: self.event_time(detail.scheduled_start),
            end: self.event_time(broadcast_end(detail.scheduled_start)),
            html_link: None,
        }
    }

    fn event_time(&self, at: DateTime<Utc>) -> EventDateTime {
        EventDateTime {
            date_time: Some(at),
            time_zone: Some(self.time_zone.clone()),
        }
    }
}

/// Whether a calendar event was created for this broadcast. The id is
/// recovered by substring containment: it sits inside the watch link of a
/// longer human-readable description, and the store itself has no notion of
/// a source broadcast.
fn matches_broadcast(event: &CalendarEvent, broadcast_id: &str) -> bool {
    event.description.contains(broadcast_id)
}

/// End of a broadcast's calendar slot. YouTube does not expose the planned
/// duration of an upcoming broadcast, so one hour is assumed.
pub fn broadcast_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::hours(1)
}
