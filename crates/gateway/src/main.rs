//! Curatly API Gateway
//!
//! The main entry point for all API requests.
//! Handles:
//! - Artwork search across the Met and AIC collections
//! - Favourites, exhibitions and profiles for signed-in users
//! - Rate limiting
//! - Observability (logging, metrics)

mod extract;
mod handlers;
mod middleware;

use anyhow::Context;
use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use curatly_common::{
    auth::SessionVerifier,
    config::{AppConfig, ServerConfig},
    db::{DbPool, Repository},
    metrics,
};
use curatly_search::{AicClient, AicSource, ArtworkSearch, MetClient, MetSource};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub met: Arc<dyn MetSource>,
    pub search: ArtworkSearch,
    pub sessions: Arc<SessionVerifier>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        db: DbPool,
        met: Arc<dyn MetSource>,
        aic: Arc<dyn AicSource>,
    ) -> Self {
        Self {
            search: ArtworkSearch::new(met.clone(), aic, &config.search),
            sessions: Arc::new(SessionVerifier::new(&config.auth)),
            repo: Repository::new(db),
            met,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<SessionVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!(
        service = %config.observability.service_name,
        "Starting Curatly API Gateway v{}",
        curatly_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    if config.observability.metrics_port > 0 {
        PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port)))
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(port = config.observability.metrics_port, "Metrics exporter listening");
    }
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Museum API clients
    let met: Arc<dyn MetSource> = Arc::new(MetClient::new(&config.museums.met)?);
    let aic: Arc<dyn AicSource> = Arc::new(AicClient::new(&config.museums.aic)?);

    // Create app state
    let state = AppState::new(config.clone(), db, met, aic);

    // Build the router
    let app = create_router(state);

    // Start the server
    let listener = bind_listener(&config.server).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Bind the configured host and port
async fn bind_listener(server: &ServerConfig) -> anyhow::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Artwork endpoints
        .route("/artworks", get(handlers::artworks::list_artworks))
        .route("/departments", get(handlers::artworks::list_departments))
        .route("/search", get(handlers::search::search_ids))

        // Session and profile endpoints
        .route("/session", get(handlers::session::current_session))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )

        // Favourite endpoints
        .route(
            "/favourites",
            get(handlers::favourites::list_favourites).post(handlers::favourites::add_favourite),
        )
        .route(
            "/favourites/{object_id}",
            get(handlers::favourites::get_favourite).delete(handlers::favourites::remove_favourite),
        )

        // Exhibition endpoints
        .route(
            "/exhibitions",
            get(handlers::exhibitions::list_exhibitions).post(handlers::exhibitions::create_exhibition),
        )
        .route(
            "/exhibitions/{id}",
            get(handlers::exhibitions::get_exhibition)
                .put(handlers::exhibitions::update_exhibition)
                .delete(handlers::exhibitions::delete_exhibition),
        )
        .route("/exhibitions/{id}/favourites", post(handlers::exhibitions::add_artwork))
        .route(
            "/exhibitions/{id}/favourites/{favourite_id}",
            delete(handlers::exhibitions::remove_artwork),
        )
        .route(
            "/exhibitions/{id}/order",
            axum::routing::put(handlers::exhibitions::reorder_artworks),
        )
        .layer(axum::middleware::from_fn(middleware::metrics::track_requests));

    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        );
        api_routes = api_routes.layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit,
        ));
    }

    // Compose the app
    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
