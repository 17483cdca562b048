//! Gateway error types.

/// Errors from the transport data gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Unknown station or expired service identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the API
    #[error("rate limited by transport API")]
    RateLimited,

    /// Rejected app_id/app_key
    #[error("unauthorized: check TRANSPORTAPI_APP_ID and TRANSPORTAPI_APP_KEY")]
    Unauthorized,

    /// Feature not configured or not available
    #[error("not configured: {0}")]
    NotConfigured(String),
}
