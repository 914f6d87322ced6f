//! Timetable value conventions: stop times and operating days as stored in `uint32` fields.

use crate::codec::CodecError;
use crate::schema::SchemaError;
use chrono::Weekday;
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Codec: {0}")]
    Codec(#[from] CodecError),
    #[error("Schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("expected a {expected} record, found {found}")]
    WrongRecord { expected: String, found: String },
    #[error("invalid time {hours}:{minutes:02}")]
    InvalidTime { hours: u32, minutes: u32 },
    #[error("invalid operating days {0:?}: expected 7 characters of 0/1, Monday first")]
    InvalidDays(String),
}

/// Minutes after midnight for `hours:minutes`.
pub fn encode_time(hours: u32, minutes: u32) -> Result<u32, TimetableError> {
    if hours >= HOURS_PER_DAY || minutes >= MINUTES_PER_HOUR {
        return Err(TimetableError::InvalidTime { hours, minutes });
    }
    Ok(hours * MINUTES_PER_HOUR + minutes)
}

/// `H:MM` for minutes after midnight, e.g. `805` -> `13:25`.
pub fn format_time(minutes: u32) -> String {
    format!("{}:{:02}", minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR)
}

/// Weekday bitmask: bit 0 is Monday, bit 6 is Sunday. Bits 7 and above carry no day;
/// `runs_on`, `days` and `Display` ignore them, so only masks below 128 survive a
/// `Display`/`parse` round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperatingDays(pub u32);

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl OperatingDays {
    pub const NONE: OperatingDays = OperatingDays(0);
    pub const WEEKDAYS: OperatingDays = OperatingDays(0b001_1111);
    pub const WEEKENDS: OperatingDays = OperatingDays(0b110_0000);
    pub const EVERY_DAY: OperatingDays = OperatingDays(0b111_1111);

    /// Parse a schedule day string such as `1111100` (Monday first).
    pub fn parse(s: &str) -> Result<Self, TimetableError> {
        if s.chars().count() != ALL_WEEKDAYS.len() {
            return Err(TimetableError::InvalidDays(s.to_string()));
        }
        let mut bits = 0u32;
        for (i, c) in s.chars().enumerate() {
            match c {
                '1' => bits |= 1 << i,
                '0' => {}
                _ => return Err(TimetableError::InvalidDays(s.to_string())),
            }
        }
        Ok(OperatingDays(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn runs_on(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Days set in the mask, Monday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        ALL_WEEKDAYS.into_iter().filter(move |d| self.runs_on(*d))
    }
}

impl FromStr for OperatingDays {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatingDays::parse(s)
    }
}

/// Seven `0`/`1` characters, Monday first. Bits above Sunday are not rendered.
impl fmt::Display for OperatingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in ALL_WEEKDAYS {
            f.write_str(if self.runs_on(day) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
