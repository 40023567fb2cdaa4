use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Errors returned by the flight options lookup
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Missing parameters")]
    MissingParameter,

    #[error("Content not found")]
    ContentNotFound,

    #[error("Content store failure: {0}")]
    Store(#[from] StoreError),
}

impl ResponseError for LookupError {
    fn status_code(&self) -> StatusCode {
        match self {
            LookupError::MissingParameter => StatusCode::BAD_REQUEST,
            LookupError::ContentNotFound => StatusCode::NOT_FOUND,
            LookupError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            LookupError::Store(e) => {
                tracing::error!("Flight options lookup failed: {}", e);
                ErrorResponse::new("Internal server error")
            }
            other => ErrorResponse::new(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
