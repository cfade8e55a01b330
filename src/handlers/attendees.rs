use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;

use crate::models::{AttendeeRecord, EventId};
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

/// `GET /events/:event_id/attendees`: who has checked in so far.
pub async fn list_attendees(
    State(state): State<AppState>,
    event_id: Result<Path<EventId>, PathRejection>,
) -> Result<Response, AppError> {
    let event_id = match event_id {
        Ok(Path(id)) if id > 0 => id,
        _ => return Err(AppError::ValidationError("Event ID is required".to_string())),
    };

    let offset = state.event_utc_offset;
    let attendees: Vec<AttendeeRecord> = state
        .registrations
        .checked_in(event_id)
        .await?
        .into_iter()
        .map(|registration| AttendeeRecord::from_registration(registration, offset))
        .collect();

    tracing::debug!(event_id, count = attendees.len(), "Attendees listed");
    Ok(success(attendees, "Attendees list fetched"))
}
