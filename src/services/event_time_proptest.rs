use chrono::{Datelike, Duration, NaiveDate, Timelike};
use proptest::prelude::*;

use super::event_time::{parse_time, EventWindow};

fn to_24h(hour12: u32, pm: bool) -> u32 {
    match (hour12, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    }
}

proptest! {
    #[test]
    fn test_meridiem_conversion_matches_manual(
        hour in 1u32..=12,
        minute in 0u32..60,
        pm in any::<bool>(),
        attached in any::<bool>(),
        lowercase in any::<bool>(),
    ) {
        let meridiem = match (pm, lowercase) {
            (true, false) => "PM",
            (true, true) => "pm",
            (false, false) => "AM",
            (false, true) => "am",
        };
        let sep = if attached { "" } else { " " };
        let raw = format!("{hour}:{minute:02}{sep}{meridiem}");
        let parsed = parse_time(&raw).unwrap();
        prop_assert_eq!(parsed.hour(), to_24h(hour, pm));
        prop_assert_eq!(parsed.minute(), minute);
    }

    #[test]
    fn test_end_is_one_hour_after_start(
        days in 0i64..3650,
        hour in 1u32..=12,
        minute in 0u32..60,
        pm in any::<bool>(),
    ) {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days);
        let date = format!("{:04}-{:02}-{:02}", base.year(), base.month(), base.day());
        let time = format!("{hour}:{minute:02} {}", if pm { "PM" } else { "AM" });

        let window = EventWindow::from_slot(&date, &time).unwrap();
        prop_assert_eq!(window.start.date(), base);
        prop_assert_eq!(window.end - window.start, Duration::minutes(60));
        prop_assert!(window.end.hour() < 24);
    }
}
