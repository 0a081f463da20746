use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use syzygy_tables_core::{StatsStore, StatsTable, TablebaseClient};

mod config;
mod routes;

use config::{Args, Config};

pub struct AppState {
    pub config: Config,
    pub stats: StatsStore,
    pub client: TablebaseClient,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/stats/reload", post(routes::tables::reload_stats))
        .route("/stats/:file", get(routes::tables::stats_json))
        .route("/graph.dot", get(routes::tables::graph_default))
        .route("/graph/:file", get(routes::tables::graph))
        .route("/download.txt", get(routes::tables::download_default))
        .route("/download/:file", get(routes::tables::download))
        .route("/endgames", get(routes::tables::endgames))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let stats = StatsStore::open(&config.stats_path).unwrap_or_else(|e| {
        warn!(path = %config.stats_path.display(), error = %e, "starting without stats");
        StatsStore::new(StatsTable::empty())
    });

    let client = match TablebaseClient::with_timeout(&config.backend, Duration::from_secs(config.timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create probe client: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.listen_addr();
    info!(name = %config.name, base_url = %config.base_url, backend = %config.backend, "starting server");

    let state = Arc::new(AppState { config, stats, client });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap();

    info!("Server running at http://{}", addr);

    axum::serve(listener, app(state)).await.unwrap();
}
