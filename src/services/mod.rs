pub mod calendar;
pub mod event_time;
#[cfg(test)]
mod event_time_proptest;
pub mod google;
