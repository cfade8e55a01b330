use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod attendees;
pub mod events;
pub mod verify;

pub use attendees::list_attendees;
pub use events::list_events;
pub use verify::verify_ticket;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "checkin-api",
    };

    success(payload, "Health check successful")
}
