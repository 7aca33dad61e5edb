use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::models::Booking;

/// What the sync endpoint reports for a mirrored booking.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncAck {
    pub event_id: Option<String>,
    pub event_link: Option<String>,
    pub message: String,
}

#[async_trait]
pub trait BookingSync: Send + Sync {
    async fn sync(&self, booking: &Booking) -> anyhow::Result<SyncAck>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointReply {
    #[serde(default)]
    success: bool,
    event_id: Option<String>,
    event_link: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Posts bookings to the sync endpoint over HTTP.
pub struct HttpBookingSync {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpBookingSync {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BookingSync for HttpBookingSync {
    async fn sync(&self, booking: &Booking) -> anyhow::Result<SyncAck> {
        let reply: EndpointReply = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "booking": booking }))
            .send()
            .await
            .context("failed to reach booking sync endpoint")?
            .json()
            .await
            .context("failed to parse booking sync response")?;

        interpret_reply(reply)
    }
}

fn interpret_reply(reply: EndpointReply) -> anyhow::Result<SyncAck> {
    if !reply.success {
        anyhow::bail!(reply.error.unwrap_or_else(|| "unknown sync failure".to_string()));
    }

    Ok(SyncAck {
        event_id: reply.event_id,
        event_link: reply.event_link,
        message: reply.message.unwrap_or_default(),
    })
}
