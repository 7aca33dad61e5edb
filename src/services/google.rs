use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::calendar::{CalendarEvent, CalendarProvider, CreatedEvent, ProviderError};
use crate::config::ServiceAccountKey;

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: Option<String>,
    html_link: Option<String>,
}

/// Google Calendar v3 over plain HTTPS, authenticated as a service account.
pub struct GoogleCalendarProvider {
    credentials: ServiceAccountKey,
    api_base: String,
    client: reqwest::Client,
}

impl GoogleCalendarProvider {
    pub fn new(credentials: ServiceAccountKey, api_base: String) -> Self {
        Self {
            credentials,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    fn signed_assertion(&self) -> Result<String, ProviderError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.credentials.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| ProviderError::new(None, format!("invalid service account key: {e}")))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| ProviderError::new(None, format!("failed to sign token request: {e}")))
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let assertion = self.signed_assertion()?;

        let resp = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::new(None, format!("failed to reach token endpoint: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        // 403/404 mapping applies to the Calendar API only.
        if !status.is_success() {
            return Err(ProviderError::new(
                None,
                format!("authentication failed: {}", error_message(status, &body)),
            ));
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map(|t| t.access_token)
            .map_err(|e| ProviderError::new(None, format!("malformed token response: {e}")))
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CreatedEvent, ProviderError> {
        let url = events_url(&self.api_base, calendar_id)?;
        let token = self.access_token().await?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(event)
            .send()
            .await
            .map_err(|e| ProviderError::new(None, format!("failed to call Calendar API: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ProviderError::new(
                Some(status.as_u16()),
                error_message(status, &body),
            ));
        }

        let inserted: InsertedEvent = serde_json::from_str(&body).map_err(|e| {
            ProviderError::new(None, format!("malformed Calendar API response: {e}"))
        })?;

        Ok(CreatedEvent {
            id: inserted.id,
            html_link: inserted.html_link,
        })
    }
}

/// `{api_base}/calendars/{calendar_id}/events`, with the id encoded as one path segment.
pub fn events_url(api_base: &str, calendar_id: &str) -> Result<Url, ProviderError> {
    let invalid = || ProviderError::new(None, format!("invalid Calendar API base URL: {api_base}"));

    let mut url = Url::parse(api_base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

/// Pull a readable message out of a Google error body.
///
/// Calendar API errors look like `{"error": {"code": 403, "message": "..."}}`;
/// the OAuth endpoint answers `{"error": "invalid_grant", "error_description": "..."}`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string())
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    value["error"]["message"]
        .as_str()
        .or_else(|| value["error_description"].as_str())
        .or_else(|| value["error"].as_str())
        .map(str::to_string)
        .unwrap_or_else(fallback)
}
