use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;

use super::store::StoreError;
use crate::models::{AttendeeSnapshot, ClosedReason, ScanOutcome};
use crate::utils::ApiResponse;

/// `data` member of a scan response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScanData {
    Attendee(AttendeeSnapshot),
    Window { reason: ClosedReason },
}

/// Maps an engine result onto the wire envelope. This is the only place scan
/// outcomes become status codes and messages.
pub fn build_response(result: Result<ScanOutcome, StoreError>) -> ApiResponse<ScanData> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = ?err, "Check-in failed on registration store");
            return ApiResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                "Failed to verify ticket. Please scan again.",
            );
        }
    };

    match outcome {
        ScanOutcome::Success(registration) => ApiResponse::new(
            StatusCode::OK,
            Some(ScanData::Attendee(registration.snapshot())),
            "Attendance marked successfully",
        ),
        ScanOutcome::AlreadyCheckedIn(registration) => {
            let message = format!(
                "Ticket already used. {} is already checked in.",
                registration.attendee_name
            );
            ApiResponse::new(
                StatusCode::CONFLICT,
                Some(ScanData::Attendee(registration.snapshot())),
                message,
            )
        }
        ScanOutcome::NotFound => ApiResponse::new(
            StatusCode::NOT_FOUND,
            None,
            "Invalid ticket. Attendee not registered for this event.",
        ),
        ScanOutcome::InvalidInput(err) => {
            ApiResponse::new(StatusCode::BAD_REQUEST, None, err.to_string())
        }
        ScanOutcome::OutOfWindow(reason) => {
            let message = match reason {
                ClosedReason::TooEarly => "This event has not started yet. Scanning is locked.",
                ClosedReason::Ended => "This event has already ended.",
            };
            ApiResponse::new(
                StatusCode::FORBIDDEN,
                Some(ScanData::Window { reason }),
                message,
            )
        }
    }
}
