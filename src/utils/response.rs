use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: status.is_success(),
            message: message.into(),
            data,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub fn success<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    ApiResponse::new(StatusCode::OK, Some(data), message).into_response()
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    ApiResponse::<()>::new(status, None, message).into_response()
}
