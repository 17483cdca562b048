//! Live board tracking.
//!
//! This module turns gateway calls into observable state:
//!
//! 1. **Refresh**: a single task merges the periodic timer, manual refresh
//!    requests and station/mode changes into board snapshots
//! 2. **Calling pattern**: per-service timetable fetches with latest-wins
//!    publishing
//! 3. **Session**: joins both with the catalogue and favorites store

mod calling;
mod config;
mod refresh;
mod session;
mod state;

pub use calling::CallingPattern;
pub use config::TrackerConfig;
pub use refresh::{RefreshCoordinator, RefreshHandle};
pub use session::Session;
pub use state::{
    BOARD_FAILED, BoardQuery, BoardSnapshot, BoardState, CallingPatternState, NO_SERVICES,
    TIMETABLE_FAILED,
};
