use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{EventId, Registration};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("registration already exists for event {event_id} and ticket '{ticket_id}'")]
    Duplicate { event_id: EventId, ticket_id: String },

    #[error("registration store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for registrations.
///
/// `try_mark_checked_in` is the only way a registration may become checked
/// in. Implementations must make its read-check-write atomic per
/// `(event_id, ticket_id)` so that exactly one caller observes `true`.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find(
        &self,
        event_id: EventId,
        ticket_id: &str,
    ) -> Result<Option<Registration>, StoreError>;

    /// Transitions the registration to checked in at `at`.
    ///
    /// Returns `false` when the registration is absent or already checked in.
    async fn try_mark_checked_in(
        &self,
        event_id: EventId,
        ticket_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Checked-in registrations of an event, newest check-in first.
    async fn checked_in(&self, event_id: EventId) -> Result<Vec<Registration>, StoreError>;
}

type RowKey = (EventId, String);

/// In-process store. Each row sits behind its own mutex; the map lock is
/// held only long enough to locate a row.
#[derive(Default)]
pub struct MemoryRegistrationStore {
    rows: RwLock<HashMap<RowKey, Arc<Mutex<Registration>>>>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, registration: Registration) -> Result<(), StoreError> {
        let key = (registration.event_id, registration.ticket_id.clone());
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.contains_key(&key) {
            return Err(StoreError::Duplicate {
                event_id: key.0,
                ticket_id: key.1,
            });
        }
        rows.insert(key, Arc::new(Mutex::new(registration)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(
        &self,
        event_id: EventId,
        ticket_id: &str,
    ) -> Result<Option<Arc<Mutex<Registration>>>, StoreError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let row = rows.get(&(event_id, ticket_id.to_string())).cloned();
        Ok(row)
    }

    fn rows_of(&self, event_id: EventId) -> Result<Vec<Arc<Mutex<Registration>>>, StoreError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let matching = rows
            .iter()
            .filter(|((row_event, _), _)| *row_event == event_id)
            .map(|(_, row)| Arc::clone(row))
            .collect();
        Ok(matching)
    }
}

fn lock(row: &Mutex<Registration>) -> Result<MutexGuard<'_, Registration>, StoreError> {
    row.lock().map_err(poisoned)
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable("registration lock poisoned".to_string())
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn find(
        &self,
        event_id: EventId,
        ticket_id: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let Some(row) = self.row(event_id, ticket_id)? else {
            return Ok(None);
        };
        let registration = lock(&row)?.clone();
        Ok(Some(registration))
    }

    async fn try_mark_checked_in(
        &self,
        event_id: EventId,
        ticket_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(row) = self.row(event_id, ticket_id)? else {
            return Ok(false);
        };
        let mut registration = lock(&row)?;
        let transitioned = registration.mark_checked_in(at);
        Ok(transitioned)
    }

    async fn checked_in(&self, event_id: EventId) -> Result<Vec<Registration>, StoreError> {
        let mut attendees = Vec::new();
        for row in self.rows_of(event_id)? {
            let registration = lock(&row)?;
            if registration.is_checked_in() {
                attendees.push(registration.clone());
            }
        }
        attendees.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(attendees)
    }
}
