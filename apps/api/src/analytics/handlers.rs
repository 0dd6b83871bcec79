//! Axum route handlers for the Analytics API.
//!
//! Each request fetches its own record snapshot and runs the engine once.
//! Nothing is cached or shared between requests.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analytics::export::{export, ExportFormat};
use crate::analytics::normalize::{normalize_records, Attribute};
use crate::analytics::segmentation::{segment, Segment};
use crate::analytics::timeseries::Granularity;
use crate::analytics::{compute_snapshot, AnalyticsOptions, AnalyticsSnapshot};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::job::RawJobRecord;
use crate::state::AppState;

/// Two years of weekly buckets.
const MAX_WINDOW: usize = 104;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub user_id: Uuid,
    pub granularity: Option<String>,
    pub window: Option<usize>,
    pub weekly_goal: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentQuery {
    pub user_id: Uuid,
    pub attribute: String,
    /// Comma-separated allow-list of values.
    pub values: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub user_id: Uuid,
    pub format: Option<String>,
    pub granularity: Option<String>,
    pub window: Option<usize>,
    pub weekly_goal: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analytics
pub async fn handle_get_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsSnapshot>, AppError> {
    let options = resolve_options(
        &state.config,
        params.granularity.as_deref(),
        params.window,
        params.weekly_goal,
        Utc::now(),
    )?;
    let raw = fetch_records(&state, params.user_id).await?;
    let snapshot = compute_snapshot(&raw, &options);

    info!(
        "Computed analytics for user {} ({} records, {} recommendations)",
        params.user_id,
        snapshot.total_records,
        snapshot.recommendations.len()
    );
    Ok(Json(snapshot))
}

/// GET /api/v1/analytics/segments
///
/// One attribute's segments, optionally restricted to `values`.
pub async fn handle_get_segments(
    State(state): State<AppState>,
    Query(params): Query<SegmentQuery>,
) -> Result<Json<Vec<Segment>>, AppError> {
    let attribute: Attribute = params.attribute.parse().map_err(AppError::Validation)?;
    let allowed: Option<Vec<String>> = params.values.as_deref().map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    });

    let raw = fetch_records(&state, params.user_id).await?;
    let records = normalize_records(&raw);
    let segments = segment(&records, attribute, allowed.as_deref());

    info!(
        "Segmented {} records by {} for user {} ({} segments)",
        records.len(),
        attribute.as_str(),
        params.user_id,
        segments.len()
    );
    Ok(Json(segments))
}

/// GET /api/v1/analytics/export
///
/// Returns the snapshot as a CSV or JSON file download.
pub async fn handle_export(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()
        .map_err(AppError::Validation)?;
    let now = Utc::now();
    let options = resolve_options(
        &state.config,
        params.granularity.as_deref(),
        params.window,
        params.weekly_goal,
        now,
    )?;

    let raw = fetch_records(&state, params.user_id).await?;
    let snapshot = compute_snapshot(&raw, &options);
    let body = export(&snapshot, format, now)?;

    info!(
        "Exported {} analytics for user {} ({} records)",
        format.extension(),
        params.user_id,
        snapshot.total_records
    );

    let disposition = format!(
        "attachment; filename=\"job-search-analytics-{}.{}\"",
        now.format("%Y-%m-%d"),
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn fetch_records(state: &AppState, user_id: Uuid) -> Result<Vec<RawJobRecord>, AppError> {
    state
        .records
        .fetch_records(user_id)
        .await
        .map_err(AppError::Internal)
}

/// Fills unset query parameters from config and validates the rest.
fn resolve_options(
    config: &Config,
    granularity: Option<&str>,
    window: Option<usize>,
    weekly_goal: Option<u32>,
    as_of: DateTime<Utc>,
) -> Result<AnalyticsOptions, AppError> {
    let granularity = match granularity {
        Some(g) => g.parse::<Granularity>().map_err(AppError::Validation)?,
        None => Granularity::Month,
    };

    let window_size = window.unwrap_or(config.default_trend_window);
    if !(1..=MAX_WINDOW).contains(&window_size) {
        return Err(AppError::Validation(format!(
            "window must be between 1 and {MAX_WINDOW}, got {window_size}"
        )));
    }

    Ok(AnalyticsOptions {
        as_of,
        granularity,
        window_size,
        weekly_goal: weekly_goal.unwrap_or(config.default_weekly_goal),
    })
}
