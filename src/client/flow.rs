use anyhow::Context;
use chrono::{NaiveDate, Utc};

use super::storage::KeyValueStore;
use super::sync::{BookingSync, SyncAck};
use crate::models::{Booking, BookingForm, BookingStatus};

pub const BOOKINGS_KEY: &str = "bookings";

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Synced(SyncAck),
    Failed(String),
}

/// Result of a submission. The booking is stored whatever `sync` says.
#[derive(Debug, Clone)]
pub struct Submission {
    pub booking: Booking,
    pub sync: SyncOutcome,
}

/// Turns a visitor's selection into a stored booking and mirrors it to the
/// calendar through the sync endpoint. The local list stays the source of
/// truth: a failed sync is logged and never rolls back the save.
pub struct BookingFlow {
    store: Box<dyn KeyValueStore>,
    sync: Box<dyn BookingSync>,
    bookings: Vec<Booking>,
}

impl BookingFlow {
    pub async fn load(store: Box<dyn KeyValueStore>, sync: Box<dyn BookingSync>) -> Self {
        let bookings = match read_bookings(store.as_ref()).await {
            Ok(bookings) => bookings,
            Err(e) => {
                tracing::error!(error = %e, "error loading bookings");
                Vec::new()
            }
        };

        Self {
            store,
            sync,
            bookings,
        }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub async fn submit(
        &mut self,
        date: NaiveDate,
        time: &str,
        form: BookingForm,
    ) -> anyhow::Result<Submission> {
        let booking = Booking {
            id: self.next_id(),
            date: date.format("%Y-%m-%d").to_string(),
            time: time.to_string(),
            name: form.name,
            email: form.email,
            phone: form.phone,
            service: form.service,
            notes: form.notes,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };

        let mut updated = self.bookings.clone();
        updated.push(booking.clone());
        self.save(updated).await?;

        let sync = match self.sync.sync(&booking).await {
            Ok(ack) => {
                tracing::info!(
                    booking_id = %booking.id,
                    event_link = ?ack.event_link,
                    "booking synced with calendar"
                );
                SyncOutcome::Synced(ack)
            }
            Err(e) => {
                tracing::error!(booking_id = %booking.id, error = %e, "failed to sync booking");
                SyncOutcome::Failed(e.to_string())
            }
        };

        Ok(Submission { booking, sync })
    }

    /// Bookings on `date` that still hold their slot.
    pub fn bookings_for_date(&self, date: NaiveDate) -> Vec<&Booking> {
        let date = date.format("%Y-%m-%d").to_string();
        self.bookings
            .iter()
            .filter(|b| b.date == date && b.status != BookingStatus::Cancelled)
            .collect()
    }

    /// Mark a booking cancelled. Returns false when no booking has that id.
    pub async fn cancel(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut updated = self.bookings.clone();
        let Some(booking) = updated.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        booking.status = BookingStatus::Cancelled;

        self.save(updated).await?;
        tracing::info!(
            booking_id = id,
            status = BookingStatus::Cancelled.as_str(),
            "booking status changed"
        );
        Ok(true)
    }

    async fn save(&mut self, updated: Vec<Booking>) -> anyhow::Result<()> {
        let json = serde_json::to_string(&updated).context("failed to serialize bookings")?;
        self.store
            .set_item(BOOKINGS_KEY, &json)
            .await
            .context("failed to save bookings")?;
        self.bookings = updated;
        Ok(())
    }

    /// `booking_<unix millis>`, nudged forward past any id already taken.
    fn next_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("booking_{millis}");
            if !self.bookings.iter().any(|b| b.id == id) {
                return id;
            }
            millis += 1;
        }
    }
}

async fn read_bookings(store: &dyn KeyValueStore) -> anyhow::Result<Vec<Booking>> {
    match store.get_item(BOOKINGS_KEY).await? {
        Some(raw) => serde_json::from_str(&raw).context("stored bookings are not valid JSON"),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::client::storage::MemoryStore;

    struct MockSync {
        fail: bool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl BookingSync for MockSync {
        async fn sync(&self, booking: &Booking) -> anyhow::Result<SyncAck> {
            self.seen.lock().unwrap().push(booking.id.clone());
            if self.fail {
                anyhow::bail!("Failed to sync with calendar: backend unavailable");
            }
            Ok(SyncAck {
                event_id: Some("evt_1".to_string()),
                event_link: Some("https://calendar.google.com/event?eid=evt_1".to_string()),
                message: "Booking confirmed and added to calendar!".to_string(),
            })
        }
    }

    /// Shares its map with the test so persisted state can be inspected.
    struct SharedStore(Arc<MemoryStore>);

    #[async_trait]
    impl KeyValueStore for SharedStore {
        async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.0.get_item(key).await
        }
        async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0.set_item(key, value).await
        }
        async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
            self.0.remove_item(key).await
        }
        async fn clear(&self) -> anyhow::Result<()> {
            self.0.clear().await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        async fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("quota exceeded")
        }
        async fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn form(name: &str) -> BookingForm {
        BookingForm {
            name: name.to_string(),
            email: "ana@example.com".to_string(),
            phone: "787-555-0100".to_string(),
            service: "Consultation".to_string(),
            notes: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn flow(fail: bool) -> (BookingFlow, Arc<MemoryStore>, Arc<Mutex<Vec<String>>>) {
        let store = Arc::new(MemoryStore::new());
        let seen = Arc::new(Mutex::new(vec![]));
        let flow = BookingFlow::load(
            Box::new(SharedStore(Arc::clone(&store))),
            Box::new(MockSync {
                fail,
                seen: Arc::clone(&seen),
            }),
        )
        .await;
        (flow, store, seen)
    }

    async fn stored(store: &MemoryStore) -> Vec<Booking> {
        let raw = store.get_item(BOOKINGS_KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_submit_persists_and_syncs() {
        let (mut flow, store, seen) = flow(false).await;

        let submission = flow
            .submit(date("2025-03-10"), "1:00 PM", form("Ana Rivera"))
            .await
            .unwrap();

        assert!(submission.booking.id.starts_with("booking_"));
        assert_eq!(submission.booking.date, "2025-03-10");
        assert_eq!(submission.booking.status, BookingStatus::Confirmed);
        assert!(matches!(
            submission.sync,
            SyncOutcome::Synced(ref ack) if ack.event_id.as_deref() == Some("evt_1")
        ));

        assert_eq!(stored(&store).await, vec![submission.booking.clone()]);
        assert_eq!(flow.bookings().len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![submission.booking.id]);
    }

    #[tokio::test]
    async fn test_sync_failure_keeps_local_booking() {
        let (mut flow, store, _) = flow(true).await;

        let submission = flow
            .submit(date("2025-03-10"), "1:00 PM", form("Ana Rivera"))
            .await
            .unwrap();

        assert!(matches!(
            submission.sync,
            SyncOutcome::Failed(ref msg) if msg.contains("backend unavailable")
        ));
        let saved = stored(&store).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_save_failure_skips_sync() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut flow = BookingFlow::load(
            Box::new(BrokenStore),
            Box::new(MockSync {
                fail: false,
                seen: Arc::clone(&seen),
            }),
        )
        .await;

        let err = flow
            .submit(date("2025-03-10"), "1:00 PM", form("Ana Rivera"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to save bookings");
        assert!(flow.bookings().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique_within_session() {
        let (mut flow, _, _) = flow(false).await;
        let a = flow.submit(date("2025-03-10"), "9:00 AM", form("A")).await.unwrap();
        let b = flow.submit(date("2025-03-10"), "10:00 AM", form("B")).await.unwrap();
        assert_ne!(a.booking.id, b.booking.id);
    }

    #[tokio::test]
    async fn test_bookings_for_date_skips_cancelled() {
        let (mut flow, store, _) = flow(false).await;
        let a = flow.submit(date("2025-03-10"), "9:00 AM", form("A")).await.unwrap();
        flow.submit(date("2025-03-10"), "10:00 AM", form("B")).await.unwrap();
        flow.submit(date("2025-03-11"), "9:00 AM", form("C")).await.unwrap();

        assert_eq!(flow.bookings_for_date(date("2025-03-10")).len(), 2);

        assert!(flow.cancel(&a.booking.id).await.unwrap());
        assert!(!flow.cancel("booking_missing").await.unwrap());

        let on_day: Vec<&str> = flow
            .bookings_for_date(date("2025-03-10"))
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(on_day, vec!["B"]);

        // Cancelled bookings are kept, only flagged.
        let saved = stored(&store).await;
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0].status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_load_existing_and_corrupt() {
        let store = Arc::new(MemoryStore::new());
        let (mut first, _, _) = flow(false).await;
        first.submit(date("2025-03-10"), "9:00 AM", form("A")).await.unwrap();
        let json = serde_json::to_string(first.bookings()).unwrap();
        store.set_item(BOOKINGS_KEY, &json).await.unwrap();

        let seen = Arc::new(Mutex::new(vec![]));
        let reloaded = BookingFlow::load(
            Box::new(SharedStore(Arc::clone(&store))),
            Box::new(MockSync {
                fail: false,
                seen: Arc::clone(&seen),
            }),
        )
        .await;
        assert_eq!(reloaded.bookings(), first.bookings());

        store.set_item(BOOKINGS_KEY, "{oops").await.unwrap();
        let corrupt = BookingFlow::load(
            Box::new(SharedStore(Arc::clone(&store))),
            Box::new(MockSync {
                fail: false,
                seen,
            }),
        )
        .await;
        assert!(corrupt.bookings().is_empty());
    }
}
