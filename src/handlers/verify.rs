use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::checkin::build_response;
use crate::models::{EventId, InputError, ScanOutcome, ScanRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub event_id: Option<Value>,
    pub qr_code: Option<String>,
}

/// `POST /verify`: one scan from a staff device.
pub async fn verify_ticket(
    State(state): State<AppState>,
    body: Result<Json<VerifyBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(%rejection, "Rejected scan body");
            return invalid(InputError::MalformedBody);
        }
    };

    let Some(event_id) = body.event_id.as_ref().and_then(parse_event_id) else {
        return invalid(InputError::MissingEventId);
    };

    let request = ScanRequest::new(event_id, body.qr_code.unwrap_or_default());
    let result = state.engine.attempt_check_in(&request).await;
    if let Ok(outcome) = &result {
        tracing::debug!(event_id, outcome = outcome.label(), "Scan handled");
    }
    build_response(result).into_response()
}

fn invalid(err: InputError) -> Response {
    build_response(Ok(ScanOutcome::InvalidInput(err))).into_response()
}

/// Accepts `7` as well as `"7"`.
fn parse_event_id(value: &Value) -> Option<EventId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_id() {
        assert_eq!(parse_event_id(&json!(7)), Some(7));
        assert_eq!(parse_event_id(&json!(" 12 ")), Some(12));
        assert_eq!(parse_event_id(&json!("seven")), None);
        assert_eq!(parse_event_id(&json!(7.5)), None);
        assert_eq!(parse_event_id(&json!(null)), None);
    }
}
