//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::warn;

use crate::catalogue::Location;
use crate::domain::Crs;
use crate::favorites::FavoritesError;
use crate::tracker::BoardQuery;
use crate::transport::TransportGateway;

use super::dto::*;
use super::state::AppState;

/// Default and maximum result counts for station search.
const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router<G: TransportGateway>(state: AppState<G>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations/search", get(search_stations::<G>))
        .route("/stations/nearest", get(nearest_station::<G>))
        .route("/stations/resolve", get(resolve_station::<G>))
        .route("/board", get(board::<G>))
        .route("/board/station", post(select_station::<G>))
        .route("/board/mode", post(set_mode::<G>))
        .route("/board/refresh", post(refresh_board::<G>))
        .route("/favorites", get(list_favorites::<G>))
        .route("/favorites/toggle", post(toggle_favorite::<G>))
        .route("/favorites/current", get(current_is_favorite::<G>))
        .route("/favorites/:code", delete(remove_favorite::<G>))
        .route(
            "/services/:id/calling-pattern",
            post(fetch_calling_pattern::<G>),
        )
        .route(
            "/calling-pattern",
            get(calling_pattern::<G>).delete(clear_calling_pattern::<G>),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stations by name or CRS code.
async fn search_stations<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);
    let stations = state
        .session
        .search(&req.q, limit)
        .into_iter()
        .map(StationResult::from)
        .collect();

    Json(StationSearchResponse { stations })
}

/// Closest station to a coordinate.
async fn nearest_station<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Query(location): Query<Location>,
) -> Result<Json<StationResult>, AppError> {
    state
        .session
        .nearest(location)
        .map(|s| Json(StationResult::from(s)))
        .ok_or_else(|| AppError::NotFound {
            message: "No station with coordinates".to_string(),
        })
}

/// Resolve typed input to a station.
async fn resolve_station<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Query(req): Query<ResolveRequest>,
) -> Result<Json<StationResult>, AppError> {
    state
        .session
        .resolve(&req.q)
        .map(|s| Json(StationResult::from(s)))
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown station: {}", req.q),
        })
}

/// The current board snapshot.
async fn board<G: TransportGateway>(State(state): State<AppState<G>>) -> Json<BoardResponse> {
    Json(BoardResponse::from(state.session.board()))
}

/// Select (or clear) the board station.
async fn select_station<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Json(req): Json<SelectStationRequest>,
) -> Result<Json<BoardQuery>, AppError> {
    let station = req.code.as_deref().map(parse_crs).transpose()?;
    state.session.select_station(station);
    Ok(Json(state.session.query()))
}

/// Switch between departures and arrivals.
async fn set_mode<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Json(req): Json<SetModeRequest>,
) -> Json<BoardQuery> {
    state.session.set_mode(req.mode);
    Json(state.session.query())
}

/// Request an immediate refresh.
async fn refresh_board<G: TransportGateway>(State(state): State<AppState<G>>) -> StatusCode {
    state.session.refresh();
    StatusCode::ACCEPTED
}

async fn list_favorites<G: TransportGateway>(
    State(state): State<AppState<G>>,
) -> Json<FavoritesResponse> {
    Json(FavoritesResponse {
        favorites: state.session.favorites(),
    })
}

/// Star or unstar the selected station.
async fn toggle_favorite<G: TransportGateway>(
    State(state): State<AppState<G>>,
) -> Result<Json<ToggleResponse>, AppError> {
    let toggled = state.session.toggle_favorite().await?;
    Ok(Json(ToggleResponse { toggled }))
}

async fn current_is_favorite<G: TransportGateway>(
    State(state): State<AppState<G>>,
) -> Json<IsFavoriteResponse> {
    Json(IsFavoriteResponse {
        is_favorite: state.session.is_favorite(),
    })
}

async fn remove_favorite<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Path(code): Path<String>,
) -> Result<Json<RemovedResponse>, AppError> {
    let code = parse_crs(&code)?;
    let removed = state.session.remove_favorite(&code).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Start loading a service's calling pattern.
async fn fetch_calling_pattern<G: TransportGateway>(
    State(state): State<AppState<G>>,
    Path(service_id): Path<String>,
) -> StatusCode {
    state.session.fetch_calling_pattern(service_id);
    StatusCode::ACCEPTED
}

async fn calling_pattern<G: TransportGateway>(
    State(state): State<AppState<G>>,
) -> Json<CallingPatternResponse> {
    Json(CallingPatternResponse::from(state.session.calling_pattern()))
}

async fn clear_calling_pattern<G: TransportGateway>(State(state): State<AppState<G>>) -> StatusCode {
    state.session.clear_calling_pattern();
    StatusCode::NO_CONTENT
}

fn parse_crs(code: &str) -> Result<Crs, AppError> {
    Crs::parse_normalized(code).map_err(|_| AppError::BadRequest {
        message: format!("Invalid station code: {code}"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<FavoritesError> for AppError {
    fn from(e: FavoritesError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = %status, error = %message, "Request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
