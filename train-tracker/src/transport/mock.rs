//! Mock gateway for testing without API access.
//!
//! Serves canned live boards and timetables, either registered in code or
//! loaded from JSON files, as if they were live API responses.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::{Crs, Mode};

use super::TransportGateway;
use super::error::GatewayError;
use super::types::{LiveBoard, Timetable};

/// Mock gateway that serves pre-loaded data.
///
/// Clones share call counters, so a test can hand one clone to the code
/// under test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    boards: HashMap<Crs, LiveBoard>,
    timetables: HashMap<String, Timetable>,
    /// Stations whose board requests fail.
    failing: HashSet<Crs>,
    /// Artificial latency per station.
    delays: HashMap<Crs, Duration>,
    timetable_delay: Option<Duration>,
    board_calls: Arc<AtomicUsize>,
    timetable_calls: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load mock data from a directory.
    ///
    /// Expects live boards named `{CRS}.json` (e.g. `KGX.json`) and
    /// timetables under `services/{id}.json`.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let data_dir = data_dir.as_ref();
        let mut mock = Self::new();

        for (stem, json) in read_json_files(data_dir)? {
            let crs = Crs::parse(&stem).map_err(|_| {
                GatewayError::NotConfigured(format!("invalid CRS in mock filename: {stem}"))
            })?;
            let board: LiveBoard = serde_json::from_str(&json).map_err(|e| {
                GatewayError::NotConfigured(format!("failed to parse mock board {stem}: {e}"))
            })?;
            mock.boards.insert(crs, board);
        }

        let services_dir = data_dir.join("services");
        if services_dir.is_dir() {
            for (id, json) in read_json_files(&services_dir)? {
                let timetable: Timetable = serde_json::from_str(&json).map_err(|e| {
                    GatewayError::NotConfigured(format!("failed to parse mock timetable {id}: {e}"))
                })?;
                mock.timetables.insert(id, timetable);
            }
        }

        if mock.boards.is_empty() {
            return Err(GatewayError::NotConfigured(format!(
                "no mock board files found in {}",
                data_dir.display()
            )));
        }

        Ok(mock)
    }

    /// Serve `board` for `station`.
    pub fn with_board(mut self, station: Crs, board: LiveBoard) -> Self {
        self.boards.insert(station, board);
        self
    }

    /// Serve `timetable` for `service_id`.
    pub fn with_timetable(mut self, service_id: impl Into<String>, timetable: Timetable) -> Self {
        self.timetables.insert(service_id.into(), timetable);
        self
    }

    /// Make board requests for `station` fail.
    pub fn with_failure(mut self, station: Crs) -> Self {
        self.failing.insert(station);
        self
    }

    /// Delay board responses for `station`.
    pub fn with_delay(mut self, station: Crs, delay: Duration) -> Self {
        self.delays.insert(station, delay);
        self
    }

    /// Delay every timetable response.
    pub fn with_timetable_delay(mut self, delay: Duration) -> Self {
        self.timetable_delay = Some(delay);
        self
    }

    /// Stations with a canned board.
    pub fn available_stations(&self) -> Vec<Crs> {
        let mut stations: Vec<Crs> = self.boards.keys().copied().collect();
        stations.sort();
        stations
    }

    /// Number of live-board requests served so far.
    pub fn board_calls(&self) -> usize {
        self.board_calls.load(Ordering::SeqCst)
    }

    /// Number of timetable requests served so far.
    pub fn timetable_calls(&self) -> usize {
        self.timetable_calls.load(Ordering::SeqCst)
    }
}

impl TransportGateway for MockGateway {
    async fn live_board(&self, station: &Crs, mode: Option<Mode>) -> Result<LiveBoard, GatewayError> {
        self.board_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(station) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(station) {
            return Err(GatewayError::Api {
                status: 503,
                message: format!("mock failure for {station}"),
            });
        }

        let mut board = self.boards.get(station).cloned().ok_or_else(|| {
            GatewayError::NotFound(format!(
                "no mock data for station {station}; available: {:?}",
                self.available_stations()
            ))
        })?;

        // Mimic the API's type filter.
        match mode {
            Some(Mode::Departures) => board.arrivals = None,
            Some(Mode::Arrivals) => board.departures = None,
            None => {}
        }

        Ok(board)
    }

    async fn timetable(&self, service_id: &str) -> Result<Timetable, GatewayError> {
        self.timetable_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.timetable_delay {
            tokio::time::sleep(delay).await;
        }

        self.timetables
            .get(service_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("service {service_id}")))
    }
}

/// Read every `*.json` file in `dir`, returning (file stem, contents).
fn read_json_files(dir: &Path) -> Result<Vec<(String, String)>, GatewayError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        GatewayError::NotConfigured(format!(
            "failed to read mock data directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            GatewayError::NotConfigured(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let json = std::fs::read_to_string(&path).map_err(|e| {
            GatewayError::NotConfigured(format!("failed to read {}: {e}", path.display()))
        })?;
        files.push((stem.to_string(), json));
    }
    Ok(files)
}
