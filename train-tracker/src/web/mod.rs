//! Web layer for the train tracker.
//!
//! Exposes the session's commands and observable state as JSON endpoints.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
