// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Analytics Server - model analytics over HTTP.
//!
//! Accepts a JSON model snapshot, runs the analytics engine on a blocking
//! worker and caches the report on disk keyed by the request body hash.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/analytics` - Analyze a model snapshot
//! - `GET /api/v1/cache/:key` - Retrieve cached result

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::cache::DiskCache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DiskCache>,
    pub config: Arc<Config>,
}

fn router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(routes::health::info))
        .route("/api/v1/health", get(routes::health::check))
        .route("/api/v1/analytics", post(routes::analytics::analyze))
        .route("/api/v1/cache/:key", get(routes::cache::get_cached))
        .layer(DefaultBodyLimit::max(config.max_body_bytes()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "info,tower_http=debug,ifc_lite_analytics_server=debug,ifc_lite_analytics=info".into()
            }),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        cache_dir = %config.cache_dir,
        max_body_size_mb = config.max_body_size_mb,
        worker_threads = config.worker_threads,
        top_n = config.analytics.top_n,
        parallel = config.analytics.parallel,
        "Starting IFC-Lite Analytics Server"
    );

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
    {
        tracing::warn!(error = %e, "Failed to size rayon thread pool, using default");
    }

    let cache = Arc::new(DiskCache::new(&config.cache_dir).await);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState {
        cache,
        config: Arc::new(config),
    });

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
