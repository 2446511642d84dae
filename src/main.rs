//! InfoCam Sync - map overlay and favorites service
//!
//! Main entry point for the local service used by the map front-end.

use infocam_sync::{
    favorites_cache::{self, FavoritesRepository},
    map_session::MapSessionHandle,
    overlay::FilterConfiguration,
    remote_api::{InfocamClient, RemoteDataService},
    request_pool::RequestPool,
    session::SessionStore,
    state::{AppConfig, AppState},
    sync_coordinator::SyncCoordinator,
    web_api,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infocam_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting InfoCam Sync v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        api_url = %config.api_url,
        database_url = %config.database_url,
        max_in_flight_requests = config.max_in_flight_requests,
        "Configuration loaded"
    );

    // Favorites store
    let pool = favorites_cache::connect(&config.database_url).await?;
    let cache = FavoritesRepository::new(pool);
    cache.init_schema().await?;
    tracing::info!("Favorites store ready");

    // Remote API + coordinator
    let client = InfocamClient::new(config.api_url.clone())?;
    tracing::info!(base_url = %client.base_url(), "InfoCam API client ready");
    let remote: Arc<dyn RemoteDataService> = Arc::new(client);
    let coordinator = Arc::new(SyncCoordinator::new(remote.clone(), cache));

    // Map session
    let session = Arc::new(SessionStore::new());
    let requests = RequestPool::new(config.max_in_flight_requests);
    let (map, map_task) = MapSessionHandle::spawn(
        coordinator.clone(),
        requests.clone(),
        session.subscribe(),
        FilterConfiguration::default(),
    );
    map.refresh().await?;

    let state = AppState {
        session,
        remote,
        coordinator,
        map,
        requests,
    };

    // Create router, with the front-end bundle when configured
    let mut app = web_api::create_router(state.clone());
    if let Some(static_dir) = &config.static_dir {
        let serve_dir = ServeDir::new(static_dir)
            .not_found_service(ServeFile::new(static_dir.join("index.html")));
        app = app.fallback_service(serve_dir);
        tracing::info!(static_dir = %static_dir.display(), "Static file serving enabled");
    }
    let app = app
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    // Router (and its map handles) dropped: let the map session wind down
    drop(state);
    map_task.await?;

    Ok(())
}
