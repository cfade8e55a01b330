use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};

use super::clock::Clock;
use super::store::StoreError;
use crate::models::{ClosedReason, Event, EventId, WindowVerdict};

/// Decides whether scanning is currently permitted for an event.
#[async_trait]
pub trait EventWindowGuard: Send + Sync {
    async fn is_within_window(&self, event_id: EventId) -> Result<WindowVerdict, StoreError>;
}

/// Where events and their dates come from.
#[async_trait]
pub trait EventSchedule: Send + Sync {
    async fn event_date(&self, event_id: EventId) -> Result<Option<NaiveDate>, StoreError>;

    /// All events, latest date first.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;
}

/// Fixed in-process schedule.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSchedule {
    events: Vec<Event>,
}

impl MemoryEventSchedule {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        let mut events: Vec<Event> = events.into_iter().collect();
        events.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Self { events }
    }
}

#[async_trait]
impl EventSchedule for MemoryEventSchedule {
    async fn event_date(&self, event_id: EventId) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self
            .events
            .iter()
            .find(|event| event.id == event_id)
            .map(|event| event.date))
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.clone())
    }
}

/// Calendar-day policy: open on the event's date only.
pub fn day_window(event_date: NaiveDate, today: NaiveDate) -> WindowVerdict {
    if today < event_date {
        WindowVerdict::Closed(ClosedReason::TooEarly)
    } else if today > event_date {
        WindowVerdict::Closed(ClosedReason::Ended)
    } else {
        WindowVerdict::Open
    }
}

/// Applies [`day_window`] to dates looked up in an [`EventSchedule`].
///
/// "Today" is taken from the clock in the configured offset. Events missing
/// from the schedule are left open; the registration lookup rejects them.
pub struct ScheduleGuard {
    schedule: Arc<dyn EventSchedule>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ScheduleGuard {
    pub fn new(
        schedule: Arc<dyn EventSchedule>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            schedule,
            clock,
            offset,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }
}

#[async_trait]
impl EventWindowGuard for ScheduleGuard {
    async fn is_within_window(&self, event_id: EventId) -> Result<WindowVerdict, StoreError> {
        let Some(date) = self.schedule.event_date(event_id).await? else {
            tracing::debug!(event_id, "Event not in schedule, deferring to lookup");
            return Ok(WindowVerdict::Open);
        };
        Ok(day_window(date, self.today()))
    }
}

/// Guard with a fixed answer for every event.
#[derive(Debug, Clone, Copy)]
pub struct StaticGuard(pub WindowVerdict);

#[async_trait]
impl EventWindowGuard for StaticGuard {
    async fn is_within_window(&self, _event_id: EventId) -> Result<WindowVerdict, StoreError> {
        Ok(self.0)
    }
}
