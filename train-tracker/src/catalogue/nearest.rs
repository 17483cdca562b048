//! Nearest-station lookup.

use geo::{Distance, Geodesic, Point};
use serde::Deserialize;

use crate::domain::Station;

/// A device position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    fn point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Geodesic distance in metres from `location` to a station, if the station
/// has coordinates.
pub fn distance_to(location: Location, station: &Station) -> Option<f64> {
    let (lat, long) = station.coordinates()?;
    Some(Geodesic.distance(location.point(), Point::new(long, lat)))
}

/// The station closest to `location` on the WGS84 ellipsoid.
///
/// Stations without both coordinates are skipped. When two stations are the
/// same distance away, the one earlier in `stations` wins.
pub fn nearest_station(stations: &[Station], location: Location) -> Option<&Station> {
    stations
        .iter()
        .filter_map(|s| distance_to(location, s).map(|d| (s, d)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(s, _)| s)
}
