//! Delay and status presentation for board entries.
//!
//! Turns a scheduled/expected pair into a whole number of minutes late, and
//! picks the label and colour a board row should show.

use serde::Serialize;

use crate::domain::{ClockTime, Mode, TrainService};

/// Expected-time sentinel for a service running to schedule.
const ON_TIME: &str = "On time";

/// Expected-time sentinel for a cancelled service.
const CANCELLED: &str = "Cancelled";

/// Minutes a service is running late at the board station.
///
/// Returns 0 when either time is missing or blank, when they are equal, when
/// the expected value is a sentinel ("On time", "Cancelled") or otherwise not
/// a clock time, and when the service is early.
///
/// # Examples
///
/// ```
/// use train_tracker::status::delay_minutes;
///
/// assert_eq!(delay_minutes(Some("10:00"), Some("10:07")), 7);
/// assert_eq!(delay_minutes(Some("23:50"), Some("00:10")), 20);
/// assert_eq!(delay_minutes(Some("10:00"), Some("On time")), 0);
/// assert_eq!(delay_minutes(Some("10:00"), Some("09:58")), 0);
/// ```
pub fn delay_minutes(scheduled: Option<&str>, expected: Option<&str>) -> u32 {
    let (Some(scheduled), Some(expected)) = (scheduled, expected) else {
        return 0;
    };
    let (scheduled, expected) = (scheduled.trim(), expected.trim());

    if scheduled.is_empty()
        || expected.is_empty()
        || scheduled == expected
        || expected == ON_TIME
        || expected == CANCELLED
        || !expected.contains(':')
    {
        return 0;
    }

    let (Ok(scheduled), Ok(expected)) = (
        ClockTime::parse_hhmm(scheduled),
        ClockTime::parse_hhmm(expected),
    ) else {
        return 0;
    };

    u32::try_from(expected.minutes_since(scheduled)).unwrap_or(0)
}

/// Colour family for a board row's status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Running to time, or starting from this station.
    OnTime,
    Cancelled,
    /// Under 15 minutes late.
    Minor,
    /// 15 to 29 minutes late.
    Moderate,
    /// 30 to 59 minutes late.
    Severe,
    /// 60 to 119 minutes late.
    Major,
    /// Two hours or more.
    Extreme,
    Neutral,
}

impl Tone {
    /// Severity tier for a positive delay.
    pub fn for_delay(minutes: u32) -> Self {
        match minutes {
            120.. => Tone::Extreme,
            60..=119 => Tone::Major,
            30..=59 => Tone::Severe,
            15..=29 => Tone::Moderate,
            _ => Tone::Minor,
        }
    }

    /// Tone implied by free-text status when the service isn't late.
    pub fn for_status(status: &str) -> Self {
        let status = status.to_lowercase();
        if status.contains("on time") || status.contains("starts here") {
            Tone::OnTime
        } else if status.contains("cancelled") {
            Tone::Cancelled
        } else {
            Tone::Neutral
        }
    }

    /// Display colour as `#RRGGBB`.
    pub fn hex(self) -> &'static str {
        match self {
            Tone::OnTime => "#4CAF50",
            Tone::Cancelled => "#FF0000",
            Tone::Minor => "#FBC02D",
            Tone::Moderate => "#F57C00",
            Tone::Severe => "#FF0000",
            Tone::Major => "#B71C1C",
            Tone::Extreme => "#7B1FA2",
            Tone::Neutral => "#888888",
        }
    }
}

/// What a board row shows in its status slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLabel {
    pub text: String,
    pub tone: Tone,
    pub delay_minutes: u32,
}

/// Pick the status label for a row.
///
/// A positive delay wins; otherwise the feed's status text is shown as-is.
pub fn present_status(
    scheduled: Option<&str>,
    expected: Option<&str>,
    status: Option<&str>,
) -> StatusLabel {
    let delay = delay_minutes(scheduled, expected);
    if delay > 0 {
        let unit = if delay == 1 { "min" } else { "mins" };
        return StatusLabel {
            text: format!("Delayed {delay} {unit}"),
            tone: Tone::for_delay(delay),
            delay_minutes: delay,
        };
    }

    let status = status.unwrap_or_default();
    StatusLabel {
        text: status.to_string(),
        tone: Tone::for_status(status),
        delay_minutes: 0,
    }
}

/// Status label for a board entry viewed in the given mode.
pub fn present_service(service: &TrainService, mode: Mode) -> StatusLabel {
    present_status(
        service.scheduled(mode),
        service.expected(mode),
        service.status.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_times_are_not_late() {
        assert_eq!(delay_minutes(None, Some("10:05")), 0);
        assert_eq!(delay_minutes(Some("10:00"), None), 0);
        assert_eq!(delay_minutes(Some(""), Some("10:05")), 0);
        assert_eq!(delay_minutes(Some("10:00"), Some("   ")), 0);
    }

    #[test]
    fn sentinels_are_not_late() {
        assert_eq!(delay_minutes(Some("10:00"), Some("On time")), 0);
        assert_eq!(delay_minutes(Some("10:00"), Some("Cancelled")), 0);
        assert_eq!(delay_minutes(Some("10:00"), Some("Delayed")), 0);
    }

    #[test]
    fn unparseable_times_are_not_late() {
        assert_eq!(delay_minutes(Some("--:--"), Some("10:05")), 0);
        assert_eq!(delay_minutes(Some("10:00"), Some("10:5x")), 0);
    }

    #[test]
    fn simple_delay() {
        assert_eq!(delay_minutes(Some("10:00"), Some("10:07")), 7);
        assert_eq!(delay_minutes(Some("10:00"), Some("12:30")), 150);
    }

    #[test]
    fn early_running_is_zero() {
        assert_eq!(delay_minutes(Some("10:00"), Some("09:55")), 0);
    }

    #[test]
    fn wraps_over_midnight() {
        assert_eq!(delay_minutes(Some("23:50"), Some("00:10")), 20);
        // Expected just before scheduled on the previous day is early, not 23h late.
        assert_eq!(delay_minutes(Some("00:05"), Some("23:58")), 0);
    }

    #[test]
    fn delay_tiers() {
        assert_eq!(Tone::for_delay(1), Tone::Minor);
        assert_eq!(Tone::for_delay(14), Tone::Minor);
        assert_eq!(Tone::for_delay(15), Tone::Moderate);
        assert_eq!(Tone::for_delay(29), Tone::Moderate);
        assert_eq!(Tone::for_delay(30), Tone::Severe);
        assert_eq!(Tone::for_delay(59), Tone::Severe);
        assert_eq!(Tone::for_delay(60), Tone::Major);
        assert_eq!(Tone::for_delay(119), Tone::Major);
        assert_eq!(Tone::for_delay(120), Tone::Extreme);
        assert_eq!(Tone::for_delay(600), Tone::Extreme);
    }

    #[test]
    fn status_text_tones() {
        assert_eq!(Tone::for_status("On time"), Tone::OnTime);
        assert_eq!(Tone::for_status("ON TIME"), Tone::OnTime);
        assert_eq!(Tone::for_status("Starts here"), Tone::OnTime);
        assert_eq!(Tone::for_status("CANCELLED"), Tone::Cancelled);
        assert_eq!(Tone::for_status("LATE"), Tone::Neutral);
        assert_eq!(Tone::for_status(""), Tone::Neutral);
    }

    #[test]
    fn delayed_label() {
        let label = present_status(Some("10:00"), Some("10:32"), Some("LATE"));
        assert_eq!(label.text, "Delayed 32 mins");
        assert_eq!(label.tone, Tone::Severe);
        assert_eq!(label.delay_minutes, 32);
        assert_eq!(label.tone.hex(), "#FF0000");

        let label = present_status(Some("10:00"), Some("10:01"), None);
        assert_eq!(label.text, "Delayed 1 min");
        assert_eq!(label.tone, Tone::Minor);
    }

    #[test]
    fn undelayed_label_uses_status_text() {
        let label = present_status(Some("10:00"), Some("On time"), Some("ON TIME"));
        assert_eq!(label.text, "ON TIME");
        assert_eq!(label.tone, Tone::OnTime);
        assert_eq!(label.delay_minutes, 0);

        let label = present_status(Some("10:00"), Some("Cancelled"), Some("CANCELLED"));
        assert_eq!(label.tone, Tone::Cancelled);

        let label = present_status(None, None, None);
        assert_eq!(label.text, "");
        assert_eq!(label.tone, Tone::Neutral);
        assert_eq!(label.tone.hex(), "#888888");
    }

    #[test]
    fn service_label_follows_mode() {
        let service = TrainService {
            aimed_departure_time: Some("10:00".into()),
            expected_departure_time: Some("10:20".into()),
            aimed_arrival_time: Some("09:58".into()),
            expected_arrival_time: Some("09:58".into()),
            status: Some("LATE".into()),
            ..Default::default()
        };
        assert_eq!(present_service(&service, Mode::Departures).delay_minutes, 20);
        assert_eq!(present_service(&service, Mode::Departures).tone, Tone::Moderate);
        assert_eq!(present_service(&service, Mode::Arrivals).delay_minutes, 0);
        assert_eq!(present_service(&service, Mode::Arrivals).text, "LATE");
    }
}
