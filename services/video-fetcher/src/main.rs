//! YouTube video fetcher
//!
//! Single-binary Rust service that:
//! 1. Polls the YouTube Data API on a fixed interval for recent videos
//! 2. Rotates across a pool of API keys as daily quotas run out
//! 3. Upserts results into a video store keyed by YouTube video ID
//! 4. Serves the stored videos and an admin API over HTTP

mod admin;
mod config;
mod error;
mod metrics;
mod service;
mod videos;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use common::{Clock, SystemClock};
use key_pool::CredentialPool;
use poller::{FetchCycle, Poller, PollerConfig};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use video_store::{VideoRepository, VideoStore};
use youtube_api::YouTubeClient;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::service::AppServices;

/// Time allowed for in-flight requests after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state for the service-level handlers
#[derive(Clone)]
struct AppState {
    services: AppServices,
    prometheus: PrometheusHandle,
}

/// Build the axum router with all routes.
///
/// Applies a concurrency limit layer based on `max_connections` and records
/// request metrics for every route.
fn build_router(state: AppState, max_connections: usize) -> Router {
    let services = state.services.clone();
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .merge(admin::build_admin_router(services.clone()))
        .merge(videos::build_videos_router(services))
        .layer(axum::middleware::from_fn(metrics::track_requests))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting video-fetcher");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        base_url = %config.youtube.base_url,
        api_keys = config.youtube.keys.len(),
        query = %config.poller.search_query,
        interval_secs = config.poller.interval_secs,
        "configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cooldown = i64::try_from(config.youtube.quota_cooldown_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("quota_cooldown_secs out of range")?;
    let keys = config
        .youtube
        .keys
        .iter()
        .map(|k| k.expose().clone())
        .collect();
    let pool = Arc::new(
        CredentialPool::new(keys, clock.clone())
            .context("no YouTube API keys configured (set YOUTUBE_API_KEYS, api_keys_file or api_keys)")?
            .with_cooldown(cooldown),
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.youtube.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let youtube = YouTubeClient::new(http)
        .with_base_url(config.youtube.base_url.clone())
        .with_region_code(config.youtube.region_code())
        .with_relevance_language(config.youtube.relevance_language());

    let repository: Arc<dyn VideoRepository> = match &config.storage.path {
        Some(path) => Arc::new(
            VideoStore::load(path.clone(), clock.clone())
                .await
                .with_context(|| format!("failed to load video store from {}", path.display()))?,
        ),
        None => {
            info!("no storage path configured, videos are kept in memory only");
            Arc::new(VideoStore::in_memory(clock.clone()))
        }
    };

    let cycle = FetchCycle::new(
        pool.clone(),
        Arc::new(youtube),
        repository.clone(),
        clock,
        config.poller.search_query.clone(),
        config.poller.max_results_per_tick,
    );
    let poller = Arc::new(Poller::new(
        cycle,
        PollerConfig {
            interval: Duration::from_secs(config.poller.interval_secs),
        },
    ));
    let services = AppServices::new(poller.clone(), pool, repository);

    let app = build_router(
        AppState {
            services,
            prometheus: prometheus_handle,
        },
        config.server.max_connections,
    );

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    if config.poller.start_on_boot {
        poller.start().await;
    } else {
        info!("start_on_boot disabled, poller idle until started via admin API");
    }

    // Graceful shutdown:
    // 1. shutdown_signal() fires on SIGTERM/SIGINT
    // 2. The poller is stopped and its in-flight cycle awaited
    // 3. axum stops accepting connections and drains within DRAIN_TIMEOUT
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;

    poller.stop().await;

    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Service info and endpoint index.
async fn root_handler() -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "service": "video-fetcher",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health",
                "metrics": "/metrics",
                "videos": "/api/videos",
                "latest_videos": "/api/videos/latest",
                "video_stats": "/api/videos/stats",
                "video": "/api/videos/{video_id}",
                "admin_status": "/api/admin/status",
                "background_start": "/api/admin/background/start",
                "background_stop": "/api/admin/background/stop",
                "force_fetch": "/api/admin/background/force-fetch",
                "background_status": "/api/admin/background/status",
                "youtube_quota": "/api/admin/youtube/quota",
            }
        })
        .to_string(),
    )
}

/// Liveness plus a summary of the poller.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.services.get_poller_status().await;
    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": "healthy",
            "background_service": status.running,
            "timestamp": status.last_tick_at,
            "fetch_count": status.tick_count,
        })
        .to_string(),
    )
}

/// Prometheus metrics endpoint. Returns metrics in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
