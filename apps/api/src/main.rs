mod analytics;
mod config;
mod db;
mod errors;
mod llm_client;
mod market;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analytics::source::PgJobSource;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::market::MarketIntelClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: logging level comes from it
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobtrack API v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    let records = Arc::new(PgJobSource::new(pool));

    let market_intel = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("Market intelligence enabled (model: {})", llm_client::MODEL);
            Some(MarketIntelClient::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; /api/v1/market-intel will answer 503");
            None
        }
    };

    info!(
        "Analytics defaults: weekly goal {}, trend window {}",
        config.default_weekly_goal, config.default_trend_window
    );

    let state = AppState {
        config: config.clone(),
        records,
        market_intel,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the web client has a fixed domain
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
