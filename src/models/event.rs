use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub type EventId = i64;

/// A scheduled event. Scanning is only permitted on `date`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: NaiveDate,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(id: EventId, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            date,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_listing_fields_only() {
        let event = Event::new(7, "Hackathon", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "id": 7, "name": "Hackathon", "date": "2025-03-14" })
        );
    }
}
