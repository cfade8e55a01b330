use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{health_check, list_attendees, list_events, verify_ticket};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/verify", post(verify_ticket))
        .route("/events", get(list_events))
        .route("/events/:event_id/attendees", get(list_attendees))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
