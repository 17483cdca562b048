//! Favorite stations.
//!
//! A small persistent set of stations keyed by CRS code. Every change is
//! written to disk and then broadcast, so all subscribers see the new list
//! without polling.

mod error;
mod store;

pub use error::FavoritesError;
pub use store::FavoritesStore;
