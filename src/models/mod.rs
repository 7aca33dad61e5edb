pub mod booking;
pub mod sync;

pub use booking::{Booking, BookingForm, BookingStatus};
pub use sync::{ErrorResponse, SyncRequest, SyncResponse};
