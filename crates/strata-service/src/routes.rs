//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, refresh, tables};
use crate::state::AppState;

/// Maximum concurrent requests for table read endpoints.
const TABLE_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /` - API banner and endpoint list
/// - `GET /health` - Health check
///
/// ## Tables (concurrency limited)
/// - `GET /kpis` - Single-row KPI summary
/// - `GET /fact_achats?limit=&skip=` - Purchase fact table, paginated
/// - `GET /dim_clients` - Customer dimension
/// - `GET /dim_produits` - Product dimension
/// - `GET /dim_dates` - Date dimension
/// - `GET /agg_jour` - Daily revenue rollup
/// - `GET /agg_semaine` - Weekly revenue rollup
/// - `GET /agg_mois` - Monthly revenue rollup
/// - `GET /ca_par_pays` - Revenue by country
/// - `GET /refresh_time/:collection` - Refresh latency for one table
#[must_use]
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let table_routes = Router::new()
        .route("/kpis", get(tables::kpis))
        .route("/fact_achats", get(tables::fact_achats))
        .route("/dim_clients", get(tables::dim_clients))
        .route("/dim_produits", get(tables::dim_produits))
        .route("/dim_dates", get(tables::dim_dates))
        .route("/agg_jour", get(tables::agg_jour))
        .route("/agg_semaine", get(tables::agg_semaine))
        .route("/agg_mois", get(tables::agg_mois))
        .route("/ca_par_pays", get(tables::ca_par_pays))
        .route("/refresh_time/:collection", get(refresh::refresh_time))
        .layer(ConcurrencyLimitLayer::new(TABLE_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(table_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_seconds)))
        .with_state(state)
}

/// Build a CORS layer from configured origins.
///
/// A single "*" entry allows any origin. Otherwise only the listed
/// origins are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.len() == 1 && origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
