//! Domain types for the train tracker.
//!
//! This module contains the validated station, board and timetable types
//! shared by the gateway, the refresh pipeline and the web surface.

mod service;
mod station;
mod time;

pub use service::{Mode, NO_TIME, Stop, TrainService};
pub use station::{Crs, FavoriteStation, InvalidCrs, Station};
pub use time::{ClockTime, TimeError};
