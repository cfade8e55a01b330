use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

/// `GET /events`: every scheduled event, latest date first.
pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_events().await?;

    tracing::debug!(count = events.len(), "Events listed");
    Ok(success(events, "Events fetched successfully"))
}
