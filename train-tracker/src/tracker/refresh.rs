//! Live board refresh loop.
//!
//! One task owns the board state. It reacts to three inputs: the periodic
//! timer, manual refresh requests, and changes of the selected station or
//! mode. The outstanding fetch is a future owned by the same task, polled
//! alongside those inputs, so replacing it is enough to cancel it and a
//! superseded fetch can never publish.

use std::sync::Arc;

use chrono::Local;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::{ClockTime, Crs, Mode};
use crate::transport::{GatewayError, LiveBoard, TransportGateway};

use super::config::TrackerConfig;
use super::state::{BOARD_FAILED, BoardQuery, BoardSnapshot, BoardState, NO_SERVICES};

/// Command side of the refresh loop, plus its published state.
///
/// Cloning is cheap. The loop stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    query: Arc<watch::Sender<BoardQuery>>,
    refresh: Arc<Notify>,
    board: watch::Receiver<BoardSnapshot>,
}

impl RefreshHandle {
    /// Select the station whose board is shown. `None` clears the board.
    pub fn select_station(&self, station: Option<Crs>) {
        self.query.send_if_modified(|q| {
            if q.station == station {
                return false;
            }
            q.station = station;
            true
        });
    }

    /// Switch between departures and arrivals.
    pub fn set_mode(&self, mode: Mode) {
        self.query.send_if_modified(|q| {
            if q.mode == mode {
                return false;
            }
            q.mode = mode;
            true
        });
    }

    /// Re-fetch the current board now, skipping any cached copy. Ignored
    /// while a fetch is running.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// The current selection.
    pub fn query(&self) -> BoardQuery {
        *self.query.borrow()
    }

    /// Live view of the selection.
    pub fn subscribe_query(&self) -> watch::Receiver<BoardQuery> {
        self.query.subscribe()
    }

    /// The latest published board.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.borrow().clone()
    }

    /// Live view of the board.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.board.clone()
    }
}

/// What asked for a refresh of the current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Manual,
    Timer,
}

/// A fetch that has been issued but not yet published.
struct InFlight {
    query: BoardQuery,
    fetch: BoxFuture<'static, Result<LiveBoard, GatewayError>>,
}

/// The task that owns board state transitions.
pub struct RefreshCoordinator<G> {
    gateway: Arc<G>,
    config: TrackerConfig,
    query: watch::Receiver<BoardQuery>,
    refresh: Arc<Notify>,
    board: watch::Sender<BoardSnapshot>,
    /// Selection the current board belongs to.
    current: BoardQuery,
}

impl<G: TransportGateway> RefreshCoordinator<G> {
    /// Start the refresh loop on the current runtime.
    pub fn spawn(gateway: Arc<G>, config: TrackerConfig) -> RefreshHandle {
        let (query_tx, query_rx) = watch::channel(BoardQuery::default());
        let (board_tx, board_rx) = watch::channel(BoardSnapshot::default());
        let refresh = Arc::new(Notify::new());

        let coordinator = Self {
            gateway,
            config,
            query: query_rx,
            refresh: Arc::clone(&refresh),
            board: board_tx,
            current: BoardQuery::default(),
        };
        tokio::spawn(coordinator.run());

        RefreshHandle {
            query: Arc::new(query_tx),
            refresh,
            board: board_rx,
        }
    }

    async fn run(mut self) {
        // The first tick completes immediately, which is the startup refresh.
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                biased;

                changed = self.query.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = *self.query.borrow_and_update();
                    self.on_query_changed(&mut in_flight, query);
                }
                _ = self.refresh.notified() => self.on_trigger(&mut in_flight, Trigger::Manual),
                _ = ticker.tick() => self.on_trigger(&mut in_flight, Trigger::Timer),
                result = settle(&mut in_flight) => {
                    if let Some(done) = in_flight.take() {
                        self.publish_result(done.query, result);
                    }
                }
            }
        }

        debug!("Refresh loop stopped");
    }

    fn on_query_changed(&mut self, in_flight: &mut Option<InFlight>, query: BoardQuery) {
        if query == self.current {
            return;
        }
        if let Some(stale) = in_flight.take() {
            debug!(station = ?stale.query.station, mode = %stale.query.mode, "Dropping superseded fetch");
        }
        self.current = query;

        match query.station {
            Some(station) => self.start_fetch(in_flight, station, false),
            None => self.publish(BoardState::Idle, None),
        }
    }

    fn on_trigger(&mut self, in_flight: &mut Option<InFlight>, trigger: Trigger) {
        let Some(station) = self.current.station else {
            self.board.send_if_modified(|s| {
                let stale = s.state != BoardState::Idle;
                s.state = BoardState::Idle;
                stale
            });
            return;
        };

        if in_flight.is_some() {
            debug!(
                station = %station,
                source = ?trigger,
                "Fetch already in flight, coalescing trigger"
            );
            return;
        }

        debug!(station = %station, source = ?trigger, "Refreshing board");
        self.start_fetch(in_flight, station, trigger == Trigger::Manual);
    }

    /// Issue a fetch for the current selection. `bypass_cache` makes the
    /// gateway forget its copy of the board first.
    fn start_fetch(
        &mut self,
        in_flight: &mut Option<InFlight>,
        station: Crs,
        bypass_cache: bool,
    ) {
        let query = self.current;
        let mode = Some(query.mode);
        let gateway = Arc::clone(&self.gateway);
        let fetch = async move {
            if bypass_cache {
                gateway.forget_board(&station, mode).await;
            }
            gateway.live_board(&station, mode).await
        }
        .boxed();

        self.publish(BoardState::Loading, None);
        *in_flight = Some(InFlight { query, fetch });
    }

    fn publish_result(&mut self, query: BoardQuery, result: Result<LiveBoard, GatewayError>) {
        // Selection may have moved on without the loop having seen it yet.
        if query != self.current || query != *self.query.borrow() {
            debug!(station = ?query.station, "Discarding result for superseded selection");
            return;
        }

        let state = match result {
            Ok(board) => match board.into_services(query.mode) {
                Some(services) if !services.is_empty() => BoardState::Success(
                    services
                        .into_iter()
                        .take(self.config.max_services)
                        .collect(),
                ),
                _ => BoardState::Error(NO_SERVICES.to_string()),
            },
            Err(e) => {
                warn!(station = ?query.station, mode = %query.mode, error = %e, "Board fetch failed");
                BoardState::Error(BOARD_FAILED.to_string())
            }
        };

        let last_updated = matches!(state, BoardState::Success(_))
            .then(|| ClockTime::from(Local::now().time()));
        self.publish(state, last_updated);
    }

    fn publish(&self, state: BoardState, last_updated: Option<ClockTime>) {
        self.board.send_replace(BoardSnapshot {
            query: self.current,
            state,
            last_updated,
        });
    }
}

/// Resolve the outstanding fetch, or never if there isn't one.
async fn settle(in_flight: &mut Option<InFlight>) -> Result<LiveBoard, GatewayError> {
    match in_flight {
        Some(f) => (&mut f.fetch).await,
        None => std::future::pending().await,
    }
}
