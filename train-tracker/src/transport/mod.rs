//! Remote data gateway.
//!
//! This module provides the HTTP client for TransportAPI's UK train
//! endpoints, a short-lived response cache in front of it, and a mock that
//! serves canned boards for tests and offline development.
//!
//! Key characteristics of the live board:
//! - Times are "HH:MM" strings in UK local time, with sentinels such as
//!   "On time" or "Cancelled" in the expected-time fields
//! - The `service` field of a board entry is the id the timetable endpoint
//!   accepts

mod cache;
mod client;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::{Crs, Mode};

pub use cache::{CacheConfig, CachedGateway};
pub use client::{TransportClient, TransportConfig};
pub use error::GatewayError;
pub use mock::MockGateway;
pub use types::{LiveBoard, ServiceList, Timetable};

/// Source of live boards and timetables.
///
/// The refresh pipeline is written against this trait so it can be driven
/// by [`MockGateway`] in tests.
pub trait TransportGateway: Send + Sync + 'static {
    /// Live board for `station`. `mode` restricts the response to one side.
    fn live_board(
        &self,
        station: &Crs,
        mode: Option<Mode>,
    ) -> impl Future<Output = Result<LiveBoard, GatewayError>> + Send;

    /// Calling pattern for a service id taken from a board entry.
    fn timetable(
        &self,
        service_id: &str,
    ) -> impl Future<Output = Result<Timetable, GatewayError>> + Send;

    /// Drop any locally held copy of a board so the next
    /// [`live_board`](Self::live_board) call goes upstream. Gateways that
    /// don't cache have nothing to do.
    fn forget_board(
        &self,
        _station: &Crs,
        _mode: Option<Mode>,
    ) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}
