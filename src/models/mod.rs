pub mod event;
pub mod registration;
pub mod scan;

pub use event::{Event, EventId};
pub use registration::{AttendanceStatus, AttendeeRecord, AttendeeSnapshot, Registration};
pub use scan::{ClosedReason, InputError, ScanOutcome, ScanRequest, WindowVerdict};
