use serde::Serialize;
use thiserror::Error;

use super::event::EventId;
use super::registration::Registration;

/// One scan as received from a staff device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub event_id: EventId,
    pub raw_payload: String,
}

impl ScanRequest {
    pub fn new(event_id: EventId, raw_payload: impl Into<String>) -> Self {
        Self {
            event_id,
            raw_payload: raw_payload.into(),
        }
    }
}

/// Why a request was rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Event ID is required")]
    MissingEventId,

    #[error("QR code is required")]
    EmptyPayload,

    #[error("Event ID and QR code are required")]
    MalformedBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedReason {
    TooEarly,
    Ended,
}

/// Verdict of the event-window guard for a given event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowVerdict {
    Open,
    Closed(ClosedReason),
}

impl WindowVerdict {
    pub fn allowed(&self) -> bool {
        matches!(self, WindowVerdict::Open)
    }

    pub fn reason(&self) -> Option<ClosedReason> {
        match self {
            WindowVerdict::Open => None,
            WindowVerdict::Closed(reason) => Some(*reason),
        }
    }
}

/// Result of a single check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Success(Registration),
    AlreadyCheckedIn(Registration),
    NotFound,
    InvalidInput(InputError),
    OutOfWindow(ClosedReason),
}

impl ScanOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Success(_) => "success",
            ScanOutcome::AlreadyCheckedIn(_) => "already_checked_in",
            ScanOutcome::NotFound => "not_found",
            ScanOutcome::InvalidInput(_) => "invalid_input",
            ScanOutcome::OutOfWindow(_) => "out_of_window",
        }
    }
}
