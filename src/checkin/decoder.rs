use serde_json::Value;

use crate::models::InputError;

const TICKET_ID_FIELD: &str = "ticket_id";

/// Extracts the ticket identifier from a scanned QR payload.
///
/// Payloads that are JSON objects with a usable `ticket_id` yield that value.
/// Anything else is taken verbatim, trimmed. Only a blank payload is rejected.
pub fn decode_ticket_id(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyPayload);
    }

    Ok(structured_ticket_id(trimmed).unwrap_or_else(|| trimmed.to_string()))
}

fn structured_ticket_id(payload: &str) -> Option<String> {
    // Only a JSON object can carry the field.
    if !payload.starts_with('{') {
        return None;
    }

    let value: Value = serde_json::from_str(payload).ok()?;
    match value.get(TICKET_ID_FIELD)? {
        Value::String(id) => {
            let id = id.trim();
            (!id.is_empty()).then(|| id.to_string())
        }
        Value::Number(id) if id.is_i64() || id.is_u64() => Some(id.to_string()),
        _ => None,
    }
}
