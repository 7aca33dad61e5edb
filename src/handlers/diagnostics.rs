use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{AppConfig, ConfigError, ServiceAccountKey, MISSING_CREDENTIAL_FIELDS};
use crate::state::AppState;

const NOT_SET: &str = "NOT SET";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub status: &'static str,
    pub environment: EnvironmentReport,
    pub error_details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    pub has_calendar_id: bool,
    pub has_credentials: bool,
    pub credentials_valid: bool,
    pub calendar_id: String,
    pub service_account: String,
}

pub fn diagnose(config: &AppConfig) -> DiagnosticsResponse {
    let parsed = config.credentials.as_deref().map(ServiceAccountKey::parse);

    let error_details = match &parsed {
        Some(Err(ConfigError::InvalidCredentials(detail)))
            if detail == MISSING_CREDENTIAL_FIELDS =>
        {
            "Credentials missing required fields".to_string()
        }
        Some(Err(_)) => "Failed to parse credentials JSON".to_string(),
        _ => String::new(),
    };

    let service_account = match &parsed {
        Some(Ok(key)) => key.client_email.clone(),
        _ => NOT_SET.to_string(),
    };

    DiagnosticsResponse {
        status: "API endpoint working",
        environment: EnvironmentReport {
            has_calendar_id: config.calendar_id.is_some(),
            has_credentials: config.credentials.is_some(),
            credentials_valid: matches!(parsed, Some(Ok(_))),
            calendar_id: config.calendar_id.clone().unwrap_or_else(|| NOT_SET.to_string()),
            service_account,
        },
        error_details,
        timestamp: Utc::now(),
    }
}

// GET /api/test
pub async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    Json(diagnose(&state.config))
}
