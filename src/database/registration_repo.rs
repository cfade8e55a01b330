use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::checkin::{RegistrationStore, StoreError};
use crate::models::{EventId, Registration};

const SQL_FIND_REGISTRATION: &str = r#"
SELECT id, event_id, ticket_id, attendee_name, course, year, gender, status, check_in_time
FROM registrations
WHERE event_id = $1 AND ticket_id = $2
"#;

// The status predicate makes the transition a compare-and-set on the row;
// concurrent updates of the same row serialize on its row lock.
const SQL_MARK_CHECKED_IN: &str = r#"
UPDATE registrations
SET status = 'CHECKED_IN', check_in_time = $3
WHERE event_id = $1 AND ticket_id = $2 AND status = 'NOT_CHECKED_IN'
"#;

const SQL_LIST_CHECKED_IN: &str = r#"
SELECT id, event_id, ticket_id, attendee_name, course, year, gender, status, check_in_time
FROM registrations
WHERE event_id = $1 AND status = 'CHECKED_IN'
ORDER BY check_in_time DESC
"#;

#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn find(
        &self,
        event_id: EventId,
        ticket_id: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let registration = sqlx::query_as::<_, Registration>(SQL_FIND_REGISTRATION)
            .bind(event_id)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(registration)
    }

    async fn try_mark_checked_in(
        &self,
        event_id: EventId,
        ticket_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(SQL_MARK_CHECKED_IN)
            .bind(event_id)
            .bind(ticket_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn checked_in(&self, event_id: EventId) -> Result<Vec<Registration>, StoreError> {
        let attendees = sqlx::query_as::<_, Registration>(SQL_LIST_CHECKED_IN)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(attendees)
    }
}
