mod api;

use axum::Router;
use btcpulse::sources::{BinanceClient, MarketDataSource};
use btcpulse::{Config, Poller, SnapshotStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SnapshotStore>,
    pub poller: Arc<Poller>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btcpulse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting BTC Pulse server on {}:{}", config.host, config.port);
    info!(
        "Tracking {:?} on {} candles (window of {})",
        config.polling.symbols, config.polling.interval, config.polling.candle_limit
    );

    let source: Arc<dyn MarketDataSource> = Arc::new(BinanceClient::new(
        config.binance_api_url.clone(),
        config.binance_api_key.clone(),
        config.request_timeout(),
    )?);

    let store = SnapshotStore::new();
    let poller = Poller::new(source, store.clone(), config.polling.clone());

    // First tick fires immediately
    poller.clone().spawn();

    let state = AppState {
        config: config.clone(),
        store,
        poller,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("BTC Pulse server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
