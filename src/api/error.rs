//! Mapping of service errors to HTTP responses

use crate::error::BookingError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error returned by every API handler
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Status code and machine-readable code for this error
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self.0.downcast_ref::<BookingError>() {
            Some(BookingError::InvalidRosterSize { .. }) => {
                (StatusCode::CONFLICT, "INVALID_ROSTER_SIZE")
            }
            Some(BookingError::DuplicateBooking { .. }) => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_BOOKING")
            }
            Some(BookingError::CapacityExceeded { .. }) => {
                (StatusCode::BAD_REQUEST, "CAPACITY_EXCEEDED")
            }
            Some(BookingError::BookingNotFound { .. })
            | Some(BookingError::NotSignedUp { .. })
            | Some(BookingError::MatchNotFound { .. })
            | Some(BookingError::UserNotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Some(BookingError::UsernameTaken { .. }) | Some(BookingError::EmailTaken { .. }) => {
                (StatusCode::CONFLICT, "ALREADY_EXISTS")
            }
            Some(BookingError::InvalidCredentials) | Some(BookingError::Unauthorized { .. }) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            Some(BookingError::Forbidden { .. }) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Some(BookingError::InvalidRequest { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST")
            }
            Some(BookingError::Storage { .. })
            | Some(BookingError::Configuration { .. })
            | Some(BookingError::Internal { .. })
            | None => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        BookingError::InvalidRequest {
            reason: rejection.body_text(),
        }
        .into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:#}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
