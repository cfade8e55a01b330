use std::sync::Arc;

use chrono::FixedOffset;

use crate::checkin::{CheckInEngine, EventSchedule, RegistrationStore};

/// Shared handles for request handlers. Lifecycle belongs to `main`.
#[derive(Clone)]
pub struct AppState {
    pub engine: CheckInEngine,
    pub registrations: Arc<dyn RegistrationStore>,
    pub events: Arc<dyn EventSchedule>,
    /// Offset for wall-clock times shown to staff.
    pub event_utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(
        engine: CheckInEngine,
        registrations: Arc<dyn RegistrationStore>,
        events: Arc<dyn EventSchedule>,
        event_utc_offset: FixedOffset,
    ) -> Self {
        Self {
            engine,
            registrations,
            events,
            event_utc_offset,
        }
    }
}
