//! TransportAPI HTTP client.
//!
//! Provides the two read-only calls the tracker needs: a station's live
//! board and a service's timetable. Every request is signed with the
//! `app_id`/`app_key` query parameters.

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::domain::{Crs, Mode};

use super::error::GatewayError;
use super::types::{LiveBoard, Timetable};
use super::TransportGateway;

/// Default base URL for TransportAPI.
const DEFAULT_BASE_URL: &str = "https://transportapi.com";

/// Configuration for the TransportAPI client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Application id sent as `app_id`
    pub app_id: String,
    /// Application key sent as `app_key`
    pub app_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TransportConfig {
    /// Create a new config with the given credentials.
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: app_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// TransportAPI client.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    base_url: Url,
    app_id: String,
    app_key: String,
}

impl TransportClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                GatewayError::NotConfigured(format!("invalid base URL {:?}", config.base_url))
            })?;

        Ok(Self {
            http,
            base_url,
            app_id: config.app_id,
            app_key: config.app_key,
        })
    }

    /// Build a GET request carrying the authentication parameters.
    ///
    /// Each segment is percent-encoded, so identifiers can't escape their
    /// path component.
    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::NotConfigured(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(self
            .http
            .get(url)
            .query(&[("app_id", &self.app_id), ("app_key", &self.app_key)]))
    }

    /// Live board for a station, optionally restricted to one side.
    pub async fn get_live_board(
        &self,
        station: &Crs,
        mode: Option<Mode>,
    ) -> Result<LiveBoard, GatewayError> {
        let code = station.to_string();
        let mut request = self.get(&["v3", "uk", "train", "station", &code, "live.json"])?;
        if let Some(mode) = mode {
            request = request.query(&[("type", mode.as_query())]);
        }

        let response = request.send().await?;
        decode(response, || format!("station {station}")).await
    }

    /// Timetable (calling pattern) for a service.
    pub async fn get_timetable(&self, service_id: &str) -> Result<Timetable, GatewayError> {
        let response = self
            .get(&["v3", "uk", "train", "service", service_id, "timetable.json"])?
            .send()
            .await?;
        decode(response, || format!("service {service_id}")).await
    }
}

/// Map status codes to errors and decode a successful body.
async fn decode<T: DeserializeOwned>(
    response: Response,
    what: impl FnOnce() -> String,
) -> Result<T, GatewayError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(GatewayError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GatewayError::RateLimited);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(what()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| GatewayError::Json {
        message: e.to_string(),
    })
}

impl TransportGateway for TransportClient {
    async fn live_board(&self, station: &Crs, mode: Option<Mode>) -> Result<LiveBoard, GatewayError> {
        self.get_live_board(station, mode).await
    }

    async fn timetable(&self, service_id: &str) -> Result<Timetable, GatewayError> {
        self.get_timetable(service_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;

    type Params = Query<HashMap<String, String>>;

    fn authorized(params: &HashMap<String, String>) -> bool {
        params.get("app_id").map(String::as_str) == Some("test-id")
            && params.get("app_key").map(String::as_str) == Some("test-key")
    }

    async fn live(Path(station): Path<String>, Query(params): Params) -> impl IntoResponse {
        if !authorized(&params) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if station == "ZZZ" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        if station == "BAD" {
            return "not json".into_response();
        }
        let side = params.get("type").cloned().unwrap_or_default();
        Json(serde_json::json!({
            "station_code": station,
            "departures": { "all": [
                { "service": "S1", "aimed_departure_time": "10:00", "status": side }
            ]}
        }))
        .into_response()
    }

    async fn timetable(Path(service): Path<String>, Query(params): Params) -> impl IntoResponse {
        if !authorized(&params) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if service == "gone" {
            return StatusCode::NOT_FOUND.into_response();
        }
        Json(serde_json::json!({
            "service": service,
            "stops": [ { "station_name": "York", "aimed_arrival_time": "11:52" } ]
        }))
        .into_response()
    }

    /// Serve a fake TransportAPI on an ephemeral port.
    async fn fake_api() -> String {
        let app = Router::new()
            .route("/v3/uk/train/station/:station/live.json", get(live))
            .route("/v3/uk/train/service/:service/timetable.json", get(timetable));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str, key: &str) -> TransportClient {
        TransportClient::new(TransportConfig::new("test-id", key).with_base_url(base_url)).unwrap()
    }

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    #[test]
    fn config_builder() {
        let config = TransportConfig::new("id", "key")
            .with_base_url("http://localhost:8080/")
            .with_timeout(5);

        assert_eq!(config.app_id, "id");
        assert_eq!(config.app_key, "key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = TransportConfig::new("id", "key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn live_board_sends_credentials_and_type() {
        let base = fake_api().await;
        let board = client(&base, "test-key")
            .get_live_board(&crs("KGX"), Some(Mode::Departures))
            .await
            .unwrap();

        assert_eq!(board.station_code.as_deref(), Some("KGX"));
        let services = board.services(Mode::Departures).unwrap();
        assert_eq!(services[0].service.as_deref(), Some("S1"));
        // The fake echoes the type filter into the status field.
        assert_eq!(services[0].status.as_deref(), Some("departure"));
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() {
        let base = fake_api().await;
        let result = client(&base, "wrong").get_live_board(&crs("KGX"), None).await;
        assert!(matches!(result, Err(GatewayError::Unauthorized)));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let base = fake_api().await;
        let result = client(&base, "test-key").get_live_board(&crs("ZZZ"), None).await;
        assert!(matches!(result, Err(GatewayError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn garbage_body_is_json_error() {
        let base = fake_api().await;
        let result = client(&base, "test-key").get_live_board(&crs("BAD"), None).await;
        assert!(matches!(result, Err(GatewayError::Json { .. })));
    }

    #[tokio::test]
    async fn timetable_round_trip() {
        let base = fake_api().await;
        let client = client(&base, "test-key");

        let timetable = client.get_timetable("S1").await.unwrap();
        assert_eq!(timetable.service.as_deref(), Some("S1"));
        assert_eq!(timetable.stops[0].station_name, "York");

        let missing = client.get_timetable("gone").await;
        assert!(matches!(missing, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn reserved_characters_stay_in_service_id() {
        let base = fake_api().await;
        let client = client(&base, "test-key");

        for id in ["S1#frag", "S1?x=1", "a/b", "50% off"] {
            let timetable = client.get_timetable(id).await.unwrap();
            assert_eq!(timetable.service.as_deref(), Some(id));
        }
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        for bad in ["not a url", "mailto:someone@example.com"] {
            let result = TransportClient::new(TransportConfig::new("id", "key").with_base_url(bad));
            assert!(matches!(result, Err(GatewayError::NotConfigured(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let client = client("http://127.0.0.1:1", "test-key");
        let result = client.get_live_board(&crs("KGX"), None).await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
    }
}
