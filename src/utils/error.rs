use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::checkin::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Registration store error")]
    StoreError(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::StoreError(_) => "STORE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg) => {
                warn!(code = self.code(), message = %msg, "Rejected request");
            }
            AppError::StoreError(e) => {
                error!(code = self.code(), error = ?e, "Registration store error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::StoreError(_) => "Something went wrong. Please try again.".to_string(),
        };

        error_response(status, public_message)
    }
}
