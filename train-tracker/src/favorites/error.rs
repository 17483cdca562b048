//! Favorites store error types.

/// Errors reading or writing the favorites file.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// Filesystem operation failed
    #[error("favorites I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored file is not a valid favorites list
    #[error("favorites file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}
