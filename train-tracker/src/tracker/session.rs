//! One user's view of the tracker.
//!
//! A [`Session`] owns the board refresh loop and the calling-pattern view and
//! joins them with the shared station catalogue and favorites store. It is
//! the surface consumers drive: every command a client can issue goes
//! through here.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::catalogue::{Location, StationCatalogue};
use crate::domain::{Crs, FavoriteStation, Mode, Station};
use crate::favorites::{FavoritesError, FavoritesStore};
use crate::transport::TransportGateway;

use super::calling::CallingPattern;
use super::config::TrackerConfig;
use super::refresh::{RefreshCoordinator, RefreshHandle};
use super::state::{BoardQuery, BoardSnapshot, CallingPatternState};

pub struct Session<G> {
    catalogue: Arc<StationCatalogue>,
    favorites: Arc<FavoritesStore>,
    board: RefreshHandle,
    calling: CallingPattern<G>,
    is_favorite: watch::Receiver<bool>,
}

impl<G: TransportGateway> Session<G> {
    /// Start a session. Spawns the refresh loop, so this must be called from
    /// within a Tokio runtime.
    pub fn new(
        gateway: Arc<G>,
        catalogue: Arc<StationCatalogue>,
        favorites: Arc<FavoritesStore>,
        config: TrackerConfig,
    ) -> Self {
        let board = RefreshCoordinator::spawn(Arc::clone(&gateway), config);
        let calling = CallingPattern::new(gateway);
        let is_favorite = watch_is_favorite(board.subscribe_query(), favorites.subscribe());

        Self {
            catalogue,
            favorites,
            board,
            calling,
            is_favorite,
        }
    }

    pub fn catalogue(&self) -> &StationCatalogue {
        &self.catalogue
    }

    // Board

    pub fn select_station(&self, station: Option<Crs>) {
        self.board.select_station(station);
    }

    pub fn set_mode(&self, mode: Mode) {
        self.board.set_mode(mode);
    }

    pub fn refresh(&self) {
        self.board.refresh();
    }

    pub fn query(&self) -> BoardQuery {
        self.board.query()
    }

    pub fn board(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn subscribe_board(&self) -> watch::Receiver<BoardSnapshot> {
        self.board.subscribe()
    }

    // Favorites

    pub fn favorites(&self) -> Vec<FavoriteStation> {
        self.favorites.list()
    }

    pub fn subscribe_favorites(&self) -> watch::Receiver<Vec<FavoriteStation>> {
        self.favorites.subscribe()
    }

    /// Whether the selected station is a favorite.
    pub fn is_favorite(&self) -> bool {
        self.query()
            .station
            .is_some_and(|code| self.favorites.contains(&code))
    }

    /// Live view of [`Session::is_favorite`].
    pub fn subscribe_is_favorite(&self) -> watch::Receiver<bool> {
        self.is_favorite.clone()
    }

    /// Star or unstar the selected station.
    ///
    /// Returns `Ok(false)` and changes nothing when no station is selected or
    /// the selected code isn't in the catalogue.
    pub async fn toggle_favorite(&self) -> Result<bool, FavoritesError> {
        let Some(code) = self.query().station else {
            debug!("Toggle favorite with no station selected");
            return Ok(false);
        };
        let Some(station) = self.catalogue.get(&code) else {
            debug!(station = %code, "Toggle favorite for unknown station");
            return Ok(false);
        };

        let added = self.favorites.toggle(FavoriteStation::from(station)).await?;
        debug!(station = %code, added, "Toggled favorite");
        Ok(true)
    }

    /// Remove a favorite by code. Returns whether it was present.
    pub async fn remove_favorite(&self, code: &Crs) -> Result<bool, FavoritesError> {
        self.favorites.remove(code).await
    }

    // Calling pattern

    pub fn fetch_calling_pattern(&self, service_id: impl Into<String>) {
        self.calling.fetch(service_id);
    }

    pub fn clear_calling_pattern(&self) {
        self.calling.clear();
    }

    pub fn calling_pattern(&self) -> CallingPatternState {
        self.calling.state()
    }

    pub fn subscribe_calling_pattern(&self) -> watch::Receiver<CallingPatternState> {
        self.calling.subscribe()
    }

    // Stations

    pub fn nearest(&self, location: Location) -> Option<&Station> {
        self.catalogue.nearest(location)
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<&Station> {
        self.catalogue.search(query, limit)
    }

    pub fn resolve(&self, input: &str) -> Option<&Station> {
        self.catalogue.resolve(input)
    }
}

/// Keep a flag in step with "selected station is in the favorites list".
///
/// The task ends once the selection or favorites channel closes, or nobody
/// is listening any more.
fn watch_is_favorite(
    mut query: watch::Receiver<BoardQuery>,
    mut favorites: watch::Receiver<Vec<FavoriteStation>>,
) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        loop {
            let station = query.borrow_and_update().station;
            let favorite = {
                let list = favorites.borrow_and_update();
                station.is_some_and(|code| list.iter().any(|f| f.code == code))
            };
            tx.send_if_modified(|current| {
                let changed = *current != favorite;
                *current = favorite;
                changed
            });

            tokio::select! {
                changed = query.changed() => if changed.is_err() { break },
                changed = favorites.changed() => if changed.is_err() { break },
                _ = tx.closed() => break,
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockGateway;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn session() -> Session<MockGateway> {
        session_with(FavoritesStore::in_memory())
    }

    fn session_with(favorites: FavoritesStore) -> Session<MockGateway> {
        let catalogue = StationCatalogue::from_stations(vec![
            Station::new("London Kings Cross", crs("KGX")).with_location(51.5320, -0.1233),
            Station::new("York", crs("YRK")).with_location(53.9580, -1.0931),
            Station::new("Leeds", crs("LDS")),
        ]);
        Session::new(
            Arc::new(MockGateway::new()),
            Arc::new(catalogue),
            Arc::new(favorites),
            TrackerConfig::default(),
        )
    }

    #[tokio::test]
    async fn toggle_without_selection_is_rejected() {
        let session = session();

        assert!(!session.toggle_favorite().await.unwrap());
        assert!(session.favorites().is_empty());
    }

    #[tokio::test]
    async fn toggle_unknown_station_is_rejected() {
        let session = session();
        session.select_station(Some(crs("ZZZ")));

        assert!(!session.toggle_favorite().await.unwrap());
        assert!(session.favorites().is_empty());
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let session = session();
        session.select_station(Some(crs("YRK")));

        assert!(session.toggle_favorite().await.unwrap());
        assert_eq!(
            session.favorites(),
            vec![FavoriteStation::new(crs("YRK"), "York")]
        );
        assert!(session.is_favorite());

        assert!(session.toggle_favorite().await.unwrap());
        assert!(session.favorites().is_empty());
        assert!(!session.is_favorite());
    }

    #[tokio::test]
    async fn overlapping_toggles_cancel_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let session = session_with(FavoritesStore::open(&path).await.unwrap());
        session.select_station(Some(crs("YRK")));

        let (a, b) = tokio::join!(session.toggle_favorite(), session.toggle_favorite());
        assert!(a.unwrap());
        assert!(b.unwrap());
        assert!(session.favorites().is_empty());
        assert!(!session.is_favorite());

        let reopened = FavoritesStore::open(&path).await.unwrap();
        assert!(reopened.list().is_empty());
    }

    #[tokio::test]
    async fn is_favorite_follows_selection_and_list() {
        let session = session();
        let mut rx = session.subscribe_is_favorite();

        session.select_station(Some(crs("KGX")));
        session.toggle_favorite().await.unwrap();
        rx.wait_for(|f| *f).await.unwrap();

        session.select_station(Some(crs("YRK")));
        rx.wait_for(|f| !*f).await.unwrap();

        session.select_station(Some(crs("KGX")));
        rx.wait_for(|f| *f).await.unwrap();

        assert!(session.remove_favorite(&crs("KGX")).await.unwrap());
        rx.wait_for(|f| !*f).await.unwrap();
        assert!(!session.remove_favorite(&crs("KGX")).await.unwrap());
    }

    #[tokio::test]
    async fn station_lookups() {
        let session = session();

        let nearest = session.nearest(Location::new(53.95, -1.09)).unwrap();
        assert_eq!(nearest.code, crs("YRK"));

        assert_eq!(session.resolve("kgx").unwrap().name, "London Kings Cross");
        assert_eq!(session.search("le", 5).len(), 1);
    }

    #[tokio::test]
    async fn calling_pattern_lifecycle() {
        let session = session();
        session.fetch_calling_pattern("nope");

        let mut rx = session.subscribe_calling_pattern();
        let state = rx
            .wait_for(|s| matches!(s, CallingPatternState::Error(_)))
            .await
            .unwrap()
            .clone();
        assert!(matches!(state, CallingPatternState::Error(_)));

        session.clear_calling_pattern();
        assert_eq!(session.calling_pattern(), CallingPatternState::Idle);
    }
}
