//! # Dashboard Web Server
//!
//! A read-only JSON API over the dashboard tables. Every request loads the rows it
//! needs through the `DbRepository` and runs them through the `AnalyticsEngine`;
//! nothing is cached between requests.

use analytics::AnalyticsEngine;
use axum::{Router, routing::get};
use configuration::{Config, DashboardSettings};
use database::DbRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub engine: AnalyticsEngine,
    /// Supplies the date range used when a request omits `start` or `end`.
    pub dashboard: DashboardSettings,
}

impl AppState {
    pub fn new(db_repo: DbRepository, dashboard: DashboardSettings) -> Self {
        Self {
            db_repo,
            engine: AnalyticsEngine::new(dashboard.options()),
            dashboard,
        }
    }
}

/// Builds the application routes over a shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/tables/:table", get(handlers::get_table))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/sales", get(handlers::get_sales))
        .route(
            "/api/sales/moving-average",
            get(handlers::get_moving_average),
        )
        .route("/api/sales/statistics", get(handlers::get_statistics))
        .route("/api/sales/correlation", get(handlers::get_correlation))
        .route("/api/delivery-status", get(handlers::get_delivery_status))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Connects to the database, applies migrations and serves until the process stops.
///
/// Tracing is initialised by the binary, not here.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;

    let db_pool = database::connect(&config.database.url, config.database.max_connections).await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let app = router(Arc::new(AppState::new(db_repo, config.dashboard)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
