//! # Tickerboard Web Server
//!
//! The REST API behind the market dashboard. Handlers fetch companies and
//! price history through a `MarketRepository` and run the `analytics` engine
//! on the result; nothing is cached between requests.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use configuration::MarketSettings;
use database::MarketRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn MarketRepository>,
    pub market: MarketSettings,
}

impl AppState {
    pub fn new(repo: Arc<dyn MarketRepository>, market: MarketSettings) -> Self {
        Self { repo, market }
    }
}

/// Builds the router with every `/api` route and the shared middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/companies", get(handlers::get_companies))
        .route("/api/companies/:id", get(handlers::get_company))
        .route(
            "/api/companies/:id/stock-data",
            get(handlers::get_stock_data).post(handlers::add_stock_data),
        )
        .route("/api/companies/:id/latest-price", get(handlers::get_latest_price))
        .route("/api/companies/:id/moving-average", get(handlers::get_moving_average))
        .route("/api/companies/:id/indicators", get(handlers::get_indicators))
        .route("/api/market-summary", get(handlers::get_market_summary))
        .route("/api/market/sectors", get(handlers::get_sectors))
        .route("/api/search/companies", get(handlers::search_companies))
        .with_state(Arc::new(state))
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024)) // Bars are tiny; 1MB is plenty
}

/// Binds `addr` and serves the API until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
