pub mod flow;
pub mod storage;
pub mod sync;

pub use flow::{BookingFlow, Submission, SyncOutcome, BOOKINGS_KEY};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use sync::{BookingSync, HttpBookingSync, SyncAck};
