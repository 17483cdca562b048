//! Caching layer for gateway responses.
//!
//! Live boards are cached per (station, mode) for a few seconds so that a
//! burst of viewers of the same board costs one upstream request. The TTL
//! stays well below the refresh interval, so periodic refreshes always see
//! fresh data. A manual refresh forgets the entry first, so it always goes
//! upstream. Timetables change less often and are kept a little longer.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Crs, Mode};

use super::TransportGateway;
use super::error::GatewayError;
use super::types::{LiveBoard, Timetable};

/// Cache key for live boards.
type BoardKey = (Crs, Option<Mode>);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached live boards.
    pub board_ttl: Duration,

    /// TTL for cached timetables.
    pub timetable_ttl: Duration,

    /// Maximum number of cached entries per kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            board_ttl: Duration::from_secs(10),
            timetable_ttl: Duration::from_secs(60),
            max_capacity: 500,
        }
    }
}

/// Gateway wrapper that caches successful responses.
///
/// Errors are never cached; the next request goes upstream again.
pub struct CachedGateway<G> {
    inner: G,
    boards: MokaCache<BoardKey, LiveBoard>,
    timetables: MokaCache<String, Timetable>,
}

impl<G: TransportGateway> CachedGateway<G> {
    /// Create a new cached gateway.
    pub fn new(inner: G, config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.board_ttl)
            .max_capacity(config.max_capacity)
            .build();
        let timetables = MokaCache::builder()
            .time_to_live(config.timetable_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            boards,
            timetables,
        }
    }
}

impl<G: TransportGateway> TransportGateway for CachedGateway<G> {
    async fn live_board(&self, station: &Crs, mode: Option<Mode>) -> Result<LiveBoard, GatewayError> {
        let key = (*station, mode);
        if let Some(cached) = self.boards.get(&key).await {
            return Ok(cached);
        }

        let board = self.inner.live_board(station, mode).await?;
        self.boards.insert(key, board.clone()).await;
        Ok(board)
    }

    async fn timetable(&self, service_id: &str) -> Result<Timetable, GatewayError> {
        if let Some(cached) = self.timetables.get(service_id).await {
            return Ok(cached);
        }

        let timetable = self.inner.timetable(service_id).await?;
        self.timetables
            .insert(service_id.to_string(), timetable.clone())
            .await;
        Ok(timetable)
    }

    async fn forget_board(&self, station: &Crs, mode: Option<Mode>) {
        self.boards.invalidate(&(*station, mode)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockGateway;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.board_ttl, Duration::from_secs(10));
        assert_eq!(config.timetable_ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 500);
    }

    #[tokio::test]
    async fn repeated_board_requests_hit_cache() {
        let mock = MockGateway::new().with_board(crs("KGX"), LiveBoard::default());
        let counter = mock.clone();
        let cached = CachedGateway::new(mock, &CacheConfig::default());

        cached.live_board(&crs("KGX"), Some(Mode::Departures)).await.unwrap();
        cached.live_board(&crs("KGX"), Some(Mode::Departures)).await.unwrap();
        assert_eq!(counter.board_calls(), 1);

        // A different side of the board is a different entry.
        cached.live_board(&crs("KGX"), Some(Mode::Arrivals)).await.unwrap();
        assert_eq!(counter.board_calls(), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let mock = MockGateway::new();
        let counter = mock.clone();
        let cached = CachedGateway::new(mock, &CacheConfig::default());

        assert!(cached.live_board(&crs("XYZ"), None).await.is_err());
        assert!(cached.live_board(&crs("XYZ"), None).await.is_err());
        assert_eq!(counter.board_calls(), 2);
    }

    #[tokio::test]
    async fn timetables_are_cached() {
        let mock = MockGateway::new().with_timetable("S1", Timetable::default());
        let counter = mock.clone();
        let cached = CachedGateway::new(mock, &CacheConfig::default());

        cached.timetable("S1").await.unwrap();
        cached.timetable("S1").await.unwrap();
        assert_eq!(counter.timetable_calls(), 1);
    }

    #[tokio::test]
    async fn forgotten_board_goes_upstream() {
        let mock = MockGateway::new().with_board(crs("KGX"), LiveBoard::default());
        let counter = mock.clone();
        let cached = CachedGateway::new(mock, &CacheConfig::default());
        let kgx = crs("KGX");

        cached.live_board(&kgx, Some(Mode::Departures)).await.unwrap();
        cached.live_board(&kgx, Some(Mode::Arrivals)).await.unwrap();
        assert_eq!(counter.board_calls(), 2);

        cached.forget_board(&kgx, Some(Mode::Departures)).await;
        cached.live_board(&kgx, Some(Mode::Departures)).await.unwrap();
        assert_eq!(counter.board_calls(), 3);

        // Only the forgotten side was dropped.
        cached.live_board(&kgx, Some(Mode::Arrivals)).await.unwrap();
        assert_eq!(counter.board_calls(), 3);
    }

    #[tokio::test]
    async fn uncached_gateway_forget_is_harmless() {
        let mock = MockGateway::new().with_board(crs("KGX"), LiveBoard::default());
        mock.forget_board(&crs("KGX"), None).await;
        mock.live_board(&crs("KGX"), None).await.unwrap();
        assert_eq!(mock.board_calls(), 1);
    }
}
