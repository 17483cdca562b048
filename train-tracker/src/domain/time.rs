//! Time-of-day handling for board times.
//!
//! TransportAPI reports board times as "HH:MM" strings in UK local time with
//! no date attached. A service that was due at 23:50 and is now expected at
//! 00:10 is twenty minutes late, not a day early, so comparisons between two
//! clock times have to pick the shorter way round midnight.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Minutes in a day.
const MINUTES_PER_DAY: i32 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day with minute precision.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::ClockTime;
///
/// let due = ClockTime::parse_hhmm("23:50").unwrap();
/// let expected = ClockTime::parse_hhmm("00:10").unwrap();
/// assert_eq!(expected.minutes_since(due), 20);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use train_tracker::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("1430").is_err());
    /// assert!(ClockTime::parse_hhmm("14:3").is_err());
    /// assert!(ClockTime::parse_hhmm("25:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes after midnight.
    pub fn minutes_of_day(&self) -> i32 {
        (self.hour() * 60 + self.minute()) as i32
    }

    /// Signed minutes from `earlier` to `self`, taking the short way round
    /// midnight.
    ///
    /// A raw difference of more than twelve hours either way is corrected by
    /// a whole day, so the result is always within -720..=720.
    pub fn minutes_since(&self, earlier: ClockTime) -> i32 {
        let mut diff = self.minutes_of_day() - earlier.minutes_of_day();
        if diff < -MINUTES_PER_DAY / 2 {
            diff += MINUTES_PER_DAY;
        }
        if diff > MINUTES_PER_DAY / 2 {
            diff -= MINUTES_PER_DAY;
        }
        diff
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        // Drop seconds so two readings in the same minute compare equal.
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(t("00:00").minutes_of_day(), 0);
        assert_eq!(t("23:59").minutes_of_day(), 23 * 60 + 59);
        assert_eq!(t("09:05").hour(), 9);
        assert_eq!(t("09:05").minute(), 5);
    }

    #[test]
    fn reject_malformed_times() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("9:05").is_err());
        assert!(ClockTime::parse_hhmm("09-05").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm("On time").is_err());
    }

    #[test]
    fn minutes_since_same_day() {
        assert_eq!(t("10:15").minutes_since(t("10:00")), 15);
        assert_eq!(t("10:00").minutes_since(t("10:15")), -15);
        assert_eq!(t("10:00").minutes_since(t("10:00")), 0);
    }

    #[test]
    fn minutes_since_wraps_forwards_over_midnight() {
        assert_eq!(t("00:10").minutes_since(t("23:50")), 20);
    }

    #[test]
    fn minutes_since_wraps_backwards_over_midnight() {
        assert_eq!(t("23:50").minutes_since(t("00:10")), -20);
    }

    #[test]
    fn twelve_hours_is_not_wrapped() {
        assert_eq!(t("12:00").minutes_since(t("00:00")), 720);
        assert_eq!(t("00:00").minutes_since(t("12:00")), -720);
    }

    #[test]
    fn from_naive_time_truncates_seconds() {
        let time = NaiveTime::from_hms_opt(14, 30, 59).unwrap();
        assert_eq!(ClockTime::from(time), t("14:30"));
        assert_eq!(ClockTime::from(time).to_string(), "14:30");
    }
}
