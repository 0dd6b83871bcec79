pub mod health;

use axum::{routing::get, Router};

use crate::analytics::handlers;
use crate::market::handlers::handle_market_intel;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analytics API
        .route("/api/v1/analytics", get(handlers::handle_get_analytics))
        .route(
            "/api/v1/analytics/segments",
            get(handlers::handle_get_segments),
        )
        .route("/api/v1/analytics/export", get(handlers::handle_export))
        // Market intelligence
        .route("/api/v1/market-intel", get(handle_market_intel))
        .with_state(state)
}
