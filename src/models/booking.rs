use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A visitor's appointment request plus contact details.
///
/// Field names follow the camelCase wire format shared by the browser
/// widget, the local store and the sync endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `H:MM AM|PM`
    pub time: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Contact fields collected by the booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub notes: Option<String>,
}
