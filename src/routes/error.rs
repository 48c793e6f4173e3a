use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request body contained unexpected values: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("please log in to your account")]
    MustBeLoggedIn,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Validation(_) => "validation_error",
            ApiError::MustBeLoggedIn => "unauthorized",
            ApiError::Store(StoreError::RequestInvalid) => "invalid_request",
            ApiError::Store(StoreError::Timeout) => "timeout",
            ApiError::Store(StoreError::LoginFailed) => "login_failed",
            ApiError::Store(StoreError::NoValidSession) => "unauthorized",
            ApiError::Store(StoreError::EmailTaken) => "email_taken",
            ApiError::Store(StoreError::Database(_) | StoreError::Migration(_)) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MustBeLoggedIn => StatusCode::UNAUTHORIZED,
            ApiError::Store(store) => match store {
                StoreError::RequestInvalid => StatusCode::BAD_REQUEST,
                StoreError::LoginFailed | StoreError::NoValidSession => StatusCode::UNAUTHORIZED,
                StoreError::EmailTaken => StatusCode::CONFLICT,
                StoreError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                StoreError::Database(_) | StoreError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Storage details stay in the logs
        let message = match self {
            ApiError::Store(StoreError::Database(_) | StoreError::Migration(_)) => {
                tracing::error!("Request failed: {}", self);
                "could not access data store".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidRequest(format!("Invalid JSON: {}", err)).into()
}
