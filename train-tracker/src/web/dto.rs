//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{ClockTime, FavoriteStation, Mode, NO_TIME, Station, Stop, TrainService};
use crate::status::{StatusLabel, present_service};
use crate::tracker::{BoardSnapshot, BoardState, CallingPatternState};

/// Query for station search.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Search query (name prefix or CRS code)
    #[serde(default)]
    pub q: String,

    /// Maximum results (default 10)
    pub limit: Option<usize>,
}

/// Query for resolving free text to one station.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub q: String,
}

/// A station in search results.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub code: String,
    pub name: String,

    /// "Name (CODE)", as shown in pickers
    pub display_name: String,

    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl From<&Station> for StationResult {
    fn from(station: &Station) -> Self {
        Self {
            code: station.code.to_string(),
            name: station.name.clone(),
            display_name: station.display_name(),
            lat: station.lat,
            long: station.long,
        }
    }
}

/// Response for station search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationResult>,
}

/// Request to change the selected station. `null` clears it.
#[derive(Debug, Deserialize)]
pub struct SelectStationRequest {
    pub code: Option<String>,
}

/// Request to switch board side.
#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: Mode,
}

/// One row of the board, with its presented status.
#[derive(Debug, Serialize)]
pub struct BoardItem {
    #[serde(flatten)]
    pub service: TrainService,

    /// Time shown in the main column for the current mode
    pub scheduled: String,

    /// Origin when viewing arrivals, destination when viewing departures
    pub counterpart: Option<String>,

    pub status_label: StatusLabel,

    /// Display colour for the status label
    pub colour: &'static str,
}

impl BoardItem {
    pub fn new(service: TrainService, mode: Mode) -> Self {
        let status_label = present_service(&service, mode);
        Self {
            scheduled: service.scheduled(mode).unwrap_or(NO_TIME).to_string(),
            counterpart: service.counterpart_name(mode).map(str::to_string),
            colour: status_label.tone.hex(),
            status_label,
            service,
        }
    }
}

/// The current board.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub station: Option<String>,
    pub mode: Mode,

    /// One of "idle", "loading", "success", "error"
    pub state: &'static str,

    /// Error message when `state` is "error"
    pub message: Option<String>,

    pub last_updated: Option<ClockTime>,
    pub services: Vec<BoardItem>,
}

impl From<BoardSnapshot> for BoardResponse {
    fn from(snapshot: BoardSnapshot) -> Self {
        let mode = snapshot.query.mode;
        let (state, message, services) = match snapshot.state {
            BoardState::Idle => ("idle", None, Vec::new()),
            BoardState::Loading => ("loading", None, Vec::new()),
            BoardState::Success(services) => (
                "success",
                None,
                services
                    .into_iter()
                    .map(|s| BoardItem::new(s, mode))
                    .collect(),
            ),
            BoardState::Error(message) => ("error", Some(message), Vec::new()),
        };

        Self {
            station: snapshot.query.station.map(|c| c.to_string()),
            mode,
            state,
            message,
            last_updated: snapshot.last_updated,
            services,
        }
    }
}

/// Response listing favorites.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteStation>,
}

/// Result of a favorite toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub toggled: bool,
}

/// Whether the selected station is a favorite.
#[derive(Debug, Serialize)]
pub struct IsFavoriteResponse {
    pub is_favorite: bool,
}

/// Result of removing a favorite.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// A calling point with display times filled in.
#[derive(Debug, Serialize)]
pub struct StopItem {
    pub station_name: String,
    pub scheduled: String,
    pub expected: String,
}

impl From<&Stop> for StopItem {
    fn from(stop: &Stop) -> Self {
        Self {
            station_name: stop.station_name.clone(),
            scheduled: stop.display_scheduled().to_string(),
            expected: stop.display_expected().to_string(),
        }
    }
}

/// The calling-pattern view.
#[derive(Debug, Serialize)]
pub struct CallingPatternResponse {
    pub state: &'static str,
    pub message: Option<String>,
    pub stops: Vec<StopItem>,
}

impl From<CallingPatternState> for CallingPatternResponse {
    fn from(state: CallingPatternState) -> Self {
        let (state, message, stops) = match state {
            CallingPatternState::Idle => ("idle", None, Vec::new()),
            CallingPatternState::Loading => ("loading", None, Vec::new()),
            CallingPatternState::Success(stops) => {
                ("success", None, stops.iter().map(StopItem::from).collect())
            }
            CallingPatternState::Error(message) => ("error", Some(message), Vec::new()),
        };
        Self {
            state,
            message,
            stops,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
