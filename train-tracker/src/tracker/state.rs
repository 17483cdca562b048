//! Observable state published by the tracker.

use serde::Serialize;

use crate::domain::{ClockTime, Crs, Mode, Stop, TrainService};

/// Message shown when the board has no services for the chosen side.
pub const NO_SERVICES: &str = "No services found";

/// Message shown when a board fetch fails for any reason.
pub const BOARD_FAILED: &str = "Failed to load data";

/// Message shown when a timetable fetch fails for any reason.
pub const TIMETABLE_FAILED: &str = "Failed to load timetable";

/// Lifecycle of the live board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum BoardState {
    /// No station selected.
    #[default]
    Idle,
    Loading,
    Success(Vec<TrainService>),
    Error(String),
}

impl BoardState {
    pub fn is_loading(&self) -> bool {
        matches!(self, BoardState::Loading)
    }

    /// Services, if the last fetch succeeded.
    pub fn services(&self) -> Option<&[TrainService]> {
        match self {
            BoardState::Success(services) => Some(services),
            _ => None,
        }
    }
}

/// The station and side of the board being viewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BoardQuery {
    pub station: Option<Crs>,
    pub mode: Mode,
}

impl BoardQuery {
    pub fn new(station: Option<Crs>, mode: Mode) -> Self {
        Self { station, mode }
    }
}

/// One published board value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// Parameters the state was produced for.
    pub query: BoardQuery,
    pub state: BoardState,
    /// Local time of the fetch, set only on success.
    pub last_updated: Option<ClockTime>,
}

/// Lifecycle of the calling-pattern view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum CallingPatternState {
    #[default]
    Idle,
    Loading,
    Success(Vec<Stop>),
    Error(String),
}
