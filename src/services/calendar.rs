use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Booking;
use crate::services::event_time::{EventWindow, SlotError, TARGET_TIMEZONE};

const NOTES_PLACEHOLDER: &str = "No additional notes";

/// Event body in the shape of the Google Calendar `events.insert` resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl Reminders {
    /// Email a day ahead, popup an hour ahead.
    pub fn fixed() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup".to_string(),
                    minutes: 60,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub html_link: Option<String>,
}

/// A failed call to the calendar provider. `code` is the HTTP status when
/// the provider answered at all.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("{message}")]
pub struct ProviderError {
    pub code: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CreatedEvent, ProviderError>;
}

pub fn build_event(booking: &Booking) -> Result<CalendarEvent, SlotError> {
    let window = EventWindow::from_slot(&booking.date, &booking.time)?;
    Ok(event_for_window(booking, &window))
}

pub fn event_for_window(booking: &Booking, window: &EventWindow) -> CalendarEvent {
    let notes = booking
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(NOTES_PLACEHOLDER);

    let description = [
        format!("Client: {}", booking.name),
        format!("Email: {}", booking.email),
        format!("Phone: {}", booking.phone),
        format!("Service: {}", booking.service),
        format!("Notes: {notes}"),
        format!("Booking ID: {}", booking.id),
    ]
    .join("\n");

    CalendarEvent {
        summary: format!("{} - {}", booking.service, booking.name),
        description,
        start: EventDateTime {
            date_time: window.start_wire(),
            time_zone: TARGET_TIMEZONE.to_string(),
        },
        end: EventDateTime {
            date_time: window.end_wire(),
            time_zone: TARGET_TIMEZONE.to_string(),
        },
        reminders: Reminders::fixed(),
    }
}
