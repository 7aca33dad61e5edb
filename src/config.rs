use std::env;

use serde_json::Value;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const MISSING_CREDENTIAL_FIELDS: &str = "credentials missing required fields";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub calendar_id: Option<String>,
    /// Raw service-account JSON, validated by [`AppConfig::calendar_settings`].
    pub credentials: Option<String>,
    pub google_api_base: String,
    pub database_url: String,
    pub booking_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Server configuration error: Missing calendar ID")]
    MissingCalendarId,

    #[error("Server configuration error: Missing credentials")]
    MissingCredentials,

    #[error("Server configuration error: Invalid credentials format")]
    InvalidCredentials(String),
}

/// The subset of a Google service-account key needed for the JWT bearer flow.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

// Keeps the private key out of logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ConfigError::InvalidCredentials(e.to_string()))?;

        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };

        match (field("client_email"), field("private_key")) {
            (Some(client_email), Some(private_key)) => Ok(Self {
                client_email,
                private_key,
                token_uri: field("token_uri").unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            }),
            _ => Err(ConfigError::InvalidCredentials(
                MISSING_CREDENTIAL_FIELDS.to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CalendarSettings {
    pub calendar_id: String,
    pub credentials: ServiceAccountKey,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            calendar_id: non_empty("GOOGLE_CALENDAR_ID"),
            credentials: non_empty("GOOGLE_CREDENTIALS"),
            google_api_base: env::var("GOOGLE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
            database_url: env::var("BOOKING_DB").unwrap_or_else(|_| "bookings.db".to_string()),
            booking_endpoint: env::var("BOOKING_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:3000/api/booking".to_string()),
        }
    }

    /// Check calendar id, then credentials presence, then credentials shape.
    pub fn calendar_settings(&self) -> Result<CalendarSettings, ConfigError> {
        let calendar_id = self
            .calendar_id
            .clone()
            .ok_or(ConfigError::MissingCalendarId)?;
        let raw = self
            .credentials
            .as_deref()
            .ok_or(ConfigError::MissingCredentials)?;
        let credentials = ServiceAccountKey::parse(raw)?;

        Ok(CalendarSettings {
            calendar_id,
            credentials,
        })
    }
}
