//! TransportAPI response DTOs.
//!
//! Field names are the API's lower_snake_case keys. Everything is optional
//! or defaulted because the API drops keys it has no value for.

use serde::{Deserialize, Serialize};

use crate::domain::{Mode, Stop, TrainService};

/// Response from `station/{code}/live.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveBoard {
    /// Station name as the API knows it.
    #[serde(default)]
    pub station_name: Option<String>,

    /// CRS code of the board station.
    #[serde(default)]
    pub station_code: Option<String>,

    /// When the API generated the board (ISO 8601).
    #[serde(default)]
    pub request_time: Option<String>,

    /// Present when departures were requested.
    #[serde(default)]
    pub departures: Option<ServiceList>,

    /// Present when arrivals were requested.
    #[serde(default)]
    pub arrivals: Option<ServiceList>,
}

impl LiveBoard {
    /// The services for one side of the board, if the API sent that side.
    pub fn services(&self, mode: Mode) -> Option<&[TrainService]> {
        let list = match mode {
            Mode::Departures => self.departures.as_ref(),
            Mode::Arrivals => self.arrivals.as_ref(),
        };
        list.map(|l| l.all.as_slice())
    }

    /// Consume the board, keeping one side.
    pub fn into_services(self, mode: Mode) -> Option<Vec<TrainService>> {
        match mode {
            Mode::Departures => self.departures,
            Mode::Arrivals => self.arrivals,
        }
        .map(|l| l.all)
    }
}

/// Wrapper the API puts around each list of services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceList {
    #[serde(default)]
    pub all: Vec<TrainService>,
}

impl From<Vec<TrainService>> for ServiceList {
    fn from(all: Vec<TrainService>) -> Self {
        Self { all }
    }
}

/// Response from `service/{id}/timetable.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub train_uid: Option<String>,

    #[serde(default)]
    pub operator_name: Option<String>,

    #[serde(default)]
    pub origin_name: Option<String>,

    #[serde(default)]
    pub destination_name: Option<String>,

    /// Calling points in running order.
    #[serde(default)]
    pub stops: Vec<Stop>,
}
