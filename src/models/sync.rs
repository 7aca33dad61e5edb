use serde::{Deserialize, Serialize};

use super::Booking;

/// Body of `POST /api/booking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub booking: Booking,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub event_link: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
