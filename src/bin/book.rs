//! Record a booking in the local store and mirror it through the sync endpoint.
//!
//! Usage: book <YYYY-MM-DD> "<H:MM AM|PM>" <name> <email> <phone> <service> [notes]

use anyhow::Context;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use booking_sync::client::{BookingFlow, HttpBookingSync, SqliteStore, SyncOutcome};
use booking_sync::config::AppConfig;
use booking_sync::db;
use booking_sync::models::BookingForm;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    anyhow::ensure!(
        (6..=7).contains(&args.len()),
        "usage: book <YYYY-MM-DD> \"<H:MM AM|PM>\" <name> <email> <phone> <service> [notes]"
    );

    let date = NaiveDate::parse_from_str(&args[0], "%Y-%m-%d")
        .with_context(|| format!("invalid date: {}", args[0]))?;
    let form = BookingForm {
        name: args[2].clone(),
        email: args[3].clone(),
        phone: args[4].clone(),
        service: args[5].clone(),
        notes: args.get(6).cloned(),
    };

    let config = AppConfig::from_env();
    let conn = db::init_db(&config.database_url)?;

    let mut flow = BookingFlow::load(
        Box::new(SqliteStore::new(conn)),
        Box::new(HttpBookingSync::new(config.booking_endpoint.clone())),
    )
    .await;

    let existing = flow.bookings_for_date(date).len();
    if existing > 0 {
        tracing::info!(date = %date, existing, "date already has reservations");
    }

    let submission = flow.submit(date, &args[1], form).await?;

    println!(
        "Booking {} confirmed for {} at {}",
        submission.booking.id, submission.booking.date, submission.booking.time
    );
    match submission.sync {
        SyncOutcome::Synced(ack) => {
            if let Some(link) = ack.event_link {
                println!("Calendar event: {link}");
            }
        }
        SyncOutcome::Failed(reason) => println!("Saved locally; calendar sync failed: {reason}"),
    }

    Ok(())
}
