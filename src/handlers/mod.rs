pub mod booking;
pub mod diagnostics;
pub mod health;
