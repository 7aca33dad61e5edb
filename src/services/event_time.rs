use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Every synced event is bound to this zone on the outbound payload.
pub const TARGET_TIMEZONE: &str = "America/Puerto_Rico";

pub const EVENT_DURATION_MINUTES: i64 = 60;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("date must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),

    #[error("time must be H:MM AM|PM, got {0:?}")]
    InvalidTime(String),
}

/// Start and end of an event as wall-clock times in [`TARGET_TIMEZONE`].
///
/// Both values are naive. The zone travels on the event payload, never
/// through the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventWindow {
    pub fn from_slot(date: &str, time: &str) -> Result<Self, SlotError> {
        let start = parse_slot(date, time)?;
        Ok(Self {
            start,
            end: start + Duration::minutes(EVENT_DURATION_MINUTES),
        })
    }

    pub fn start_wire(&self) -> String {
        self.start.format(WIRE_FORMAT).to_string()
    }

    pub fn end_wire(&self) -> String {
        self.end.format(WIRE_FORMAT).to_string()
    }
}

/// Combine a `YYYY-MM-DD` date and an `H:MM AM|PM` time into one wall-clock instant.
pub fn parse_slot(date: &str, time: &str) -> Result<NaiveDateTime, SlotError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Ok(date.and_time(time))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, SlotError> {
    let invalid = || SlotError::InvalidDate(raw.to_string());

    let parts: Vec<&str> = raw.trim().split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse a 12-hour clock time; the meridiem may be spaced (`1:30 PM`) or
/// attached (`1:30PM`). Without a meridiem the hour is taken as-is on a
/// 24-hour clock and the minute must be numeric. With one, a missing or
/// non-numeric minute reads as zero.
pub fn parse_time(raw: &str) -> Result<NaiveTime, SlotError> {
    let invalid = || SlotError::InvalidTime(raw.to_string());

    let mut tokens = raw.split_whitespace();
    let clock = tokens.next().ok_or_else(invalid)?;
    let meridiem = tokens.next();
    if tokens.next().is_some() {
        return Err(invalid());
    }

    let (clock, meridiem) = match meridiem {
        Some(m) => (clock, Some(m.to_ascii_uppercase())),
        None => split_meridiem(clock),
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => match m.parse::<u32>() {
            Ok(m) => (h, m),
            Err(_) if meridiem.is_some() => (h, 0),
            Err(_) => return Err(invalid()),
        },
        None => (clock, 0),
    };
    let hour: u32 = hour.parse().map_err(|_| invalid())?;

    let hour = match meridiem.as_deref() {
        Some("PM") => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            if hour == 12 { 12 } else { hour + 12 }
        }
        Some("AM") => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            if hour == 12 { 0 } else { hour }
        }
        Some(_) => return Err(invalid()),
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Split a trailing `AM`/`PM` (any case) off a clock token like `11:45pm`.
fn split_meridiem(clock: &str) -> (&str, Option<String>) {
    let upper = clock.to_ascii_uppercase();
    for suffix in ["AM", "PM"] {
        if upper.ends_with(suffix) {
            return (&clock[..clock.len() - suffix.len()], Some(suffix.to_string()));
        }
    }
    (clock, None)
}
