use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use train_tracker::catalogue::StationCatalogue;
use train_tracker::config::AppConfig;
use train_tracker::favorites::FavoritesStore;
use train_tracker::tracker::Session;
use train_tracker::transport::{CachedGateway, MockGateway, TransportClient, TransportGateway};
use train_tracker::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("train_tracker=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let catalogue = StationCatalogue::load(&config.stations_path).await;
    info!(
        stations = catalogue.len(),
        path = %config.stations_path.display(),
        "Loaded station catalogue"
    );

    let favorites = FavoritesStore::open(config.favorites_path.clone()).await?;
    info!(count = favorites.list().len(), "Loaded favorites");

    let catalogue = Arc::new(catalogue);
    let favorites = Arc::new(favorites);

    match &config.mock_dir {
        Some(dir) => {
            let mock = MockGateway::from_dir(dir)?;
            info!(
                dir = %dir.display(),
                stations = ?mock.available_stations(),
                "Serving mock data"
            );
            serve(mock, catalogue, favorites, &config).await
        }
        None => {
            for var in config.missing_credentials() {
                warn!("{var} not set. API calls will fail.");
            }
            let client = TransportClient::new(config.transport.clone())?;
            let gateway = CachedGateway::new(client, &config.cache);
            serve(gateway, catalogue, favorites, &config).await
        }
    }
}

async fn serve<G: TransportGateway>(
    gateway: G,
    catalogue: Arc<StationCatalogue>,
    favorites: Arc<FavoritesStore>,
    config: &AppConfig,
) -> Result<(), Box<dyn Error>> {
    let session = Session::new(
        Arc::new(gateway),
        catalogue,
        favorites,
        config.tracker.clone(),
    );
    let app = create_router(AppState::new(session));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Train tracker listening");
    axum::serve(listener, app).await?;
    Ok(())
}
