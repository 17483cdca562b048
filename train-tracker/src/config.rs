//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::tracker::TrackerConfig;
use crate::transport::{CacheConfig, TransportConfig};

const APP_ID: &str = "TRANSPORTAPI_APP_ID";
const APP_KEY: &str = "TRANSPORTAPI_APP_KEY";
const BASE_URL: &str = "TRANSPORTAPI_BASE_URL";
const STATIONS: &str = "TRAIN_TRACKER_STATIONS";
const FAVORITES: &str = "TRAIN_TRACKER_FAVORITES";
const REFRESH_SECS: &str = "TRAIN_TRACKER_REFRESH_SECS";
const ADDR: &str = "TRAIN_TRACKER_ADDR";
const MOCK_DIR: &str = "TRAIN_TRACKER_MOCK_DIR";

const DEFAULT_STATIONS: &str = "data/uk_stations.json";
const DEFAULT_FAVORITES: &str = "data/favorites.json";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Invalid environment value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be a socket address like 127.0.0.1:3000, got {value:?}")]
    InvalidAddr { var: &'static str, value: String },
}

/// Everything `main` needs to assemble the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub cache: CacheConfig,
    pub tracker: TrackerConfig,

    /// Station catalogue JSON
    pub stations_path: PathBuf,

    /// Favorites JSON, created on first write
    pub favorites_path: PathBuf,

    pub addr: SocketAddr,

    /// Serve canned boards from this directory instead of calling the API
    pub mock_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut transport = TransportConfig::new(
            get(APP_ID).unwrap_or_default(),
            get(APP_KEY).unwrap_or_default(),
        );
        if let Some(url) = get(BASE_URL) {
            transport = transport.with_base_url(url);
        }

        let mut tracker = TrackerConfig::default();
        if let Some(value) = get(REFRESH_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidSeconds {
                    var: REFRESH_SECS,
                    value: value.clone(),
                })?;
            tracker = tracker.with_refresh_interval(Duration::from_secs(secs));
        }

        let addr = get(ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr { var: ADDR, value: addr.clone() })?;

        Ok(Self {
            transport,
            cache: CacheConfig::default(),
            tracker,
            stations_path: get(STATIONS).unwrap_or_else(|| DEFAULT_STATIONS.into()).into(),
            favorites_path: get(FAVORITES).unwrap_or_else(|| DEFAULT_FAVORITES.into()).into(),
            addr,
            mock_dir: get(MOCK_DIR).map(PathBuf::from),
        })
    }

    /// Names of credential variables that are unset.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.transport.app_id.is_empty() {
            missing.push(APP_ID);
        }
        if self.transport.app_key.is_empty() {
            missing.push(APP_KEY);
        }
        missing
    }
}
