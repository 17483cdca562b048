//! Application state for the web layer.

use std::sync::Arc;

use crate::tracker::Session;

/// Shared application state.
///
/// Generic over the gateway so the same router serves live and mock data.
pub struct AppState<G> {
    pub session: Arc<Session<G>>,
}

impl<G> AppState<G> {
    pub fn new(session: Session<G>) -> Self {
        Self {
            session: Arc::new(session),
        }
    }
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}
