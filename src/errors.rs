use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::models::ErrorResponse;
use crate::services::calendar::ProviderError;
use crate::services::event_time::SlotError;

/// Everything the sync endpoint can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    #[error("Calendar access denied. Please ensure the calendar is shared with the service account.")]
    PermissionDenied,

    #[error("Calendar not found. Please check the calendar ID.")]
    CalendarNotFound,

    #[error("Failed to sync with calendar: {0}")]
    Provider(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl From<SlotError> for SyncError {
    fn from(err: SlotError) -> Self {
        SyncError::InvalidBooking(err.to_string())
    }
}

impl From<ProviderError> for SyncError {
    fn from(err: ProviderError) -> Self {
        match err.code {
            Some(403) => SyncError::PermissionDenied,
            Some(404) => SyncError::CalendarNotFound,
            _ if err.message.is_empty() => SyncError::Provider("Unknown error".to_string()),
            _ => SyncError::Provider(err.message),
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
