//! Ticket verification and check-in.
//!
//! A scan flows through [`decode_ticket_id`], the [`EventWindowGuard`], the
//! [`RegistrationStore`] lookup and guarded transition, and finally
//! [`build_response`].

pub mod clock;
pub mod decoder;
pub mod engine;
pub mod guard;
pub mod response;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use decoder::decode_ticket_id;
pub use engine::CheckInEngine;
pub use guard::{
    day_window, EventSchedule, EventWindowGuard, MemoryEventSchedule, ScheduleGuard, StaticGuard,
};
pub use response::{build_response, ScanData};
pub use store::{MemoryRegistrationStore, RegistrationStore, StoreError};
