use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use booking_sync::app;
use booking_sync::config::AppConfig;
use booking_sync::services::google::GoogleCalendarProvider;
use booking_sync::state::{AppState, CalendarSync};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let calendar = config.calendar_settings().map(|settings| {
        tracing::info!(
            calendar_id = %settings.calendar_id,
            service_account = %settings.credentials.client_email,
            "calendar sync configured"
        );
        CalendarSync {
            calendar_id: settings.calendar_id,
            provider: Box::new(GoogleCalendarProvider::new(
                settings.credentials,
                config.google_api_base.clone(),
            )),
        }
    });
    if let Err(e) = &calendar {
        tracing::warn!(error = %e, "calendar sync disabled; booking requests will fail");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        calendar,
    });

    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
