use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::market::MarketInsights;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarketIntelQuery {
    pub role: String,
    pub location: Option<String>,
}

/// GET /api/v1/market-intel
///
/// Answers 503 when no LLM API key is configured.
pub async fn handle_market_intel(
    State(state): State<AppState>,
    Query(params): Query<MarketIntelQuery>,
) -> Result<Json<MarketInsights>, AppError> {
    let client = state.market_intel.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Market intelligence is not configured".to_string())
    })?;

    let insights = client
        .fetch(&params.role, params.location.as_deref())
        .await?;
    Ok(Json(insights))
}
