use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::checkin::{EventSchedule, StoreError};
use crate::models::{Event, EventId};

const SQL_FIND_EVENT: &str = r#"
SELECT id, name, date, created_at
FROM events
WHERE id = $1
"#;

const SQL_LIST_EVENTS: &str = r#"
SELECT id, name, date, created_at
FROM events
ORDER BY date DESC, id DESC
"#;

#[derive(Clone)]
pub struct PgEventSchedule {
    pool: PgPool,
}

impl PgEventSchedule {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(SQL_FIND_EVENT)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }
}

#[async_trait]
impl EventSchedule for PgEventSchedule {
    async fn event_date(&self, event_id: EventId) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self.find_event(event_id).await?.map(|event| event.date))
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(SQL_LIST_EVENTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}
