//! Station catalogue.
//!
//! The catalogue is a static JSON array of stations shipped with the app and
//! read once at startup. It backs station search, input resolution and the
//! nearest-station lookup. A missing or unreadable file is not fatal: the
//! catalogue is simply empty.

mod nearest;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Crs, Station};

pub use nearest::{Location, distance_to, nearest_station};

/// Station names in the catalogue often carry this prefix, but people
/// search for "Euston" rather than "London Euston".
const LONDON_PREFIX: &str = "london ";

/// A catalogue row as it appears on disk, before code validation.
#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(rename = "stationName", alias = "name")]
    name: String,
    #[serde(rename = "crsCode", alias = "code")]
    code: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default, alias = "lon", alias = "lng")]
    long: Option<f64>,
}

/// Read-only list of known stations, in file order.
#[derive(Debug, Clone, Default)]
pub struct StationCatalogue {
    stations: Vec<Station>,
    by_code: HashMap<Crs, usize>,
}

impl StationCatalogue {
    /// Build a catalogue from stations. Later duplicates of a code are dropped.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut by_code = HashMap::with_capacity(stations.len());
        let mut kept = Vec::with_capacity(stations.len());
        for station in stations {
            if by_code.contains_key(&station.code) {
                debug!(station = %station.code, "Skipping duplicate catalogue entry");
                continue;
            }
            by_code.insert(station.code, kept.len());
            kept.push(station);
        }
        Self {
            stations: kept,
            by_code,
        }
    }

    /// Parse a catalogue from JSON text.
    ///
    /// Rows whose code is not a valid CRS after upper-casing are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawStation> = serde_json::from_str(json)?;
        Ok(Self::from_stations(build_stations(raw)))
    }

    /// Load the catalogue file, falling back to an empty catalogue on any
    /// read or parse failure.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read station catalogue");
                return Self::default();
            }
        };

        match Self::from_json(&contents) {
            Ok(catalogue) => catalogue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse station catalogue");
                Self::default()
            }
        }
    }

    /// All stations in catalogue order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Look up a station by code.
    pub fn get(&self, code: &Crs) -> Option<&Station> {
        self.by_code.get(code).map(|&i| &self.stations[i])
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations whose name or code starts with `query`, ignoring case.
    ///
    /// A leading "London " on the station name is optional, so "eus" finds
    /// London Euston. Blank queries match nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Station> {
        let pattern = query.trim().to_lowercase();
        if pattern.is_empty() {
            return Vec::new();
        }

        self.stations
            .iter()
            .filter(|s| {
                let name = s.name.to_lowercase();
                name.starts_with(&pattern)
                    || name
                        .strip_prefix(LONDON_PREFIX)
                        .is_some_and(|rest| rest.starts_with(&pattern))
                    || s.code.as_str().to_lowercase().starts_with(&pattern)
            })
            .take(limit)
            .collect()
    }

    /// Resolve free-text input to a single station.
    ///
    /// Accepts a bare code ("kgx"), the picker's display form
    /// ("London Kings Cross (KGX)"), an exact name, or an exact name without
    /// its "London " prefix. The first match in catalogue order wins.
    pub fn resolve(&self, input: &str) -> Option<&Station> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let lower = input.to_lowercase();

        self.stations.iter().find(|s| {
            let code = s.code.as_str();
            let name = s.name.to_lowercase();
            code.eq_ignore_ascii_case(input)
                || lower.contains(&format!("({})", code.to_lowercase()))
                || name == lower
                || name
                    .strip_prefix(LONDON_PREFIX)
                    .is_some_and(|rest| rest == lower)
        })
    }

    /// Closest station with coordinates to `location`.
    pub fn nearest(&self, location: Location) -> Option<&Station> {
        nearest_station(&self.stations, location)
    }
}

/// Validate raw rows into stations.
fn build_stations(raw: Vec<RawStation>) -> Vec<Station> {
    raw.into_iter()
        .filter_map(|r| match Crs::parse_normalized(&r.code) {
            Ok(code) => Some(Station {
                name: r.name,
                code,
                lat: r.lat,
                long: r.long,
            }),
            Err(e) => {
                debug!(code = %r.code, error = %e, "Skipping catalogue entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"[
        {"stationName": "London Kings Cross", "crsCode": "KGX", "lat": 51.5308, "long": -0.1238},
        {"stationName": "London Euston", "crsCode": "EUS", "lat": 51.5282, "long": -0.1337},
        {"stationName": "Eastleigh", "crsCode": "ESL"},
        {"stationName": "Reading", "crsCode": "rdg", "lat": 51.4588, "long": -0.9718},
        {"stationName": "Bad Row", "crsCode": "invalid"}
    ]"#;

    fn catalogue() -> StationCatalogue {
        StationCatalogue::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn parse_filters_invalid_codes() {
        let catalogue = catalogue();
        assert_eq!(catalogue.len(), 4);
        assert!(catalogue.get(&Crs::parse("RDG").unwrap()).is_some());
    }

    #[test]
    fn duplicate_codes_keep_first() {
        let kgx = Crs::parse("KGX").unwrap();
        let catalogue = StationCatalogue::from_stations(vec![
            Station::new("Kings Cross", kgx),
            Station::new("Imposter", kgx),
        ]);
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.get(&kgx).unwrap().name, "Kings Cross");
    }

    #[test]
    fn search_matches_name_prefix_and_code() {
        let catalogue = catalogue();
        let codes = |q: &str| -> Vec<String> {
            catalogue
                .search(q, 10)
                .iter()
                .map(|s| s.code.to_string())
                .collect()
        };

        assert_eq!(codes("read"), vec!["RDG"]);
        assert_eq!(codes("KG"), vec!["KGX"]);
        // "London " is optional on the name.
        assert_eq!(codes("eus"), vec!["EUS"]);
        assert_eq!(codes("e"), vec!["EUS", "ESL"]);
        assert_eq!(codes("london"), vec!["KGX", "EUS"]);
        assert!(codes("   ").is_empty());
    }

    #[test]
    fn search_respects_limit() {
        assert_eq!(catalogue().search("london", 1).len(), 1);
    }

    #[test]
    fn resolve_accepts_code_display_and_names() {
        let catalogue = catalogue();
        let resolve = |q: &str| catalogue.resolve(q).map(|s| s.code.as_str().to_string());

        assert_eq!(resolve("kgx").as_deref(), Some("KGX"));
        assert_eq!(resolve("London Euston (EUS)").as_deref(), Some("EUS"));
        assert_eq!(resolve("reading").as_deref(), Some("RDG"));
        assert_eq!(resolve("Euston").as_deref(), Some("EUS"));
        assert_eq!(resolve("Eust"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn nearest_uses_catalogue_stations() {
        let catalogue = catalogue();
        let nearest = catalogue.nearest(Location::new(51.46, -0.97)).unwrap();
        assert_eq!(nearest.code.as_str(), "RDG");
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uk_stations.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalogue = StationCatalogue::load(&path).await;
        assert_eq!(catalogue.len(), 4);
        assert_eq!(catalogue.stations()[0].code.as_str(), "KGX");
    }

    #[tokio::test]
    async fn load_falls_back_to_empty() {
        let catalogue = StationCatalogue::load("/nonexistent/uk_stations.json").await;
        assert!(catalogue.is_empty());

        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(StationCatalogue::load(&path).await.is_empty());
    }

    #[tokio::test]
    async fn bundled_catalogue_loads() {
        let catalogue = StationCatalogue::load("data/uk_stations.json").await;
        assert!(!catalogue.is_empty());

        // Finsbury Park has no coordinates, so it never wins a nearest lookup.
        let nearest = catalogue.nearest(Location::new(51.5642, -0.1065)).unwrap();
        assert_ne!(nearest.code.as_str(), "FPK");
        assert_eq!(catalogue.resolve("Euston").unwrap().code.as_str(), "EUS");
    }
}
