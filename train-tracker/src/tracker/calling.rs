//! Calling pattern of a single service.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::transport::TransportGateway;

use super::state::{CallingPatternState, TIMETABLE_FAILED};

/// Fetches and publishes the stops of one service at a time.
///
/// Each fetch or clear starts a new generation. A fetch only publishes its
/// result if no newer generation has started in the meantime.
pub struct CallingPattern<G> {
    gateway: Arc<G>,
    state: Arc<watch::Sender<CallingPatternState>>,
    generation: Arc<AtomicU64>,
}

impl<G: TransportGateway> CallingPattern<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(CallingPatternState::Idle);
        Self {
            gateway,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start loading the timetable for `service_id`.
    pub fn fetch(&self, service_id: impl Into<String>) {
        let service_id = service_id.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(CallingPatternState::Loading);

        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let next = match gateway.timetable(&service_id).await {
                Ok(timetable) => CallingPatternState::Success(timetable.stops),
                Err(e) => {
                    warn!(service = %service_id, error = %e, "Timetable fetch failed");
                    CallingPatternState::Error(TIMETABLE_FAILED.to_string())
                }
            };

            let published = state.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *s = next;
                true
            });
            if !published {
                debug!(service = %service_id, "Discarding superseded timetable");
            }
        });
    }

    /// Return to Idle, dropping any fetch still running.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(CallingPatternState::Idle);
    }

    pub fn state(&self) -> CallingPatternState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallingPatternState> {
        self.state.subscribe()
    }
}
