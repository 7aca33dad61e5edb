use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::errors::SyncError;
use crate::models::{SyncRequest, SyncResponse};
use crate::services::calendar::build_event;
use crate::state::AppState;

const CONFIRMATION: &str = "Booking confirmed and added to calendar!";

// POST /api/booking
pub async fn sync_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, SyncError> {
    let sync = state.calendar.as_ref().map_err(|e| {
        tracing::error!(error = %e, "calendar sync is not configured");
        SyncError::from(e.clone())
    })?;

    let Json(SyncRequest { booking }) = payload.map_err(|e| {
        tracing::warn!(error = %e, "rejected booking payload");
        SyncError::InvalidBooking(e.body_text())
    })?;

    tracing::info!(
        booking_id = %booking.id,
        name = %booking.name,
        date = %booking.date,
        time = %booking.time,
        "processing booking"
    );

    let event = build_event(&booking).map_err(|e| {
        tracing::warn!(booking_id = %booking.id, error = %e, "unparseable booking slot");
        SyncError::from(e)
    })?;

    tracing::info!(
        start = %event.start.date_time,
        end = %event.end.date_time,
        timezone = %event.start.time_zone,
        "creating calendar event"
    );

    let created = sync
        .provider
        .insert_event(&sync.calendar_id, &event)
        .await
        .map_err(|e| {
            tracing::error!(
                booking_id = %booking.id,
                code = ?e.code,
                error = %e,
                "calendar sync failed"
            );
            SyncError::from(e)
        })?;

    tracing::info!(booking_id = %booking.id, event_id = ?created.id, "calendar event created");

    Ok(Json(SyncResponse {
        success: true,
        event_id: created.id,
        event_link: created.html_link,
        message: CONFIRMATION.to_string(),
    }))
}

// OPTIONS /api/booking
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> SyncError {
    SyncError::MethodNotAllowed
}
