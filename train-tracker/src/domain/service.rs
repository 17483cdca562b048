//! Board entries and calling-pattern stops.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder shown when a time is unknown.
pub const NO_TIME: &str = "--:--";

/// Which side of the board is being viewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Departures,
    Arrivals,
}

impl Mode {
    pub fn is_arrivals(self) -> bool {
        matches!(self, Mode::Arrivals)
    }

    /// Value of the gateway's `type` filter for this mode.
    pub fn as_query(self) -> &'static str {
        match self {
            Mode::Departures => "departure",
            Mode::Arrivals => "arrival",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Departures => f.write_str("departures"),
            Mode::Arrivals => f.write_str("arrivals"),
        }
    }
}

/// One service on a live board.
///
/// Times are the raw "HH:MM" strings from the feed. Expected times may hold
/// a sentinel such as "On time" or "Cancelled" instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainService {
    pub aimed_departure_time: Option<String>,
    pub expected_departure_time: Option<String>,
    pub aimed_arrival_time: Option<String>,
    pub expected_arrival_time: Option<String>,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    /// ATOC operator code, e.g. "GR".
    pub operator: Option<String>,
    pub operator_name: Option<String>,
    /// Identifier accepted by the timetable endpoint.
    pub service: Option<String>,
}

impl TrainService {
    /// Scheduled time at the board station for the given mode.
    pub fn scheduled(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Departures => self.aimed_departure_time.as_deref(),
            Mode::Arrivals => self.aimed_arrival_time.as_deref(),
        }
    }

    /// Expected time at the board station for the given mode.
    pub fn expected(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Departures => self.expected_departure_time.as_deref(),
            Mode::Arrivals => self.expected_arrival_time.as_deref(),
        }
    }

    /// The far end of the journey: where an arrival came from, or where a
    /// departure is going.
    pub fn counterpart_name(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Departures => self.destination_name.as_deref(),
            Mode::Arrivals => self.origin_name.as_deref(),
        }
    }
}

/// One calling point in a service's timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default)]
    pub station_name: String,
    pub aimed_arrival_time: Option<String>,
    pub expected_arrival_time: Option<String>,
    pub aimed_departure_time: Option<String>,
    pub expected_departure_time: Option<String>,
}

impl Stop {
    /// Scheduled time to show for this stop: arrival if known, else departure.
    pub fn display_scheduled(&self) -> &str {
        first_non_blank(&[&self.aimed_arrival_time, &self.aimed_departure_time]).unwrap_or(NO_TIME)
    }

    /// Expected time to show, falling back to the scheduled display time.
    pub fn display_expected(&self) -> &str {
        first_non_blank(&[&self.expected_arrival_time, &self.expected_departure_time])
            .unwrap_or_else(|| self.display_scheduled())
    }
}

fn first_non_blank<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .find(|s| !s.trim().is_empty())
}
