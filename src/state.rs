use crate::config::{AppConfig, ConfigError};
use crate::services::calendar::CalendarProvider;

/// A validated calendar target together with the provider that writes to it.
pub struct CalendarSync {
    pub calendar_id: String,
    pub provider: Box<dyn CalendarProvider>,
}

pub struct AppState {
    pub config: AppConfig,
    /// Validated once at startup; a configuration error is reported on every sync request.
    pub calendar: Result<CalendarSync, ConfigError>,
}
