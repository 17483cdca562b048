//! Live UK train board tracker.
//!
//! Follows a station's departures or arrivals from TransportAPI, refreshing
//! on a timer and on demand, and keeps a persistent list of favorite
//! stations. The web layer exposes the session to clients as JSON.

pub mod catalogue;
pub mod config;
pub mod domain;
pub mod favorites;
pub mod status;
pub mod tracker;
pub mod transport;
pub mod web;
