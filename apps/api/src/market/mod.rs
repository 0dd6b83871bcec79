//! Market intelligence: role/location hiring conditions from the LLM service.
//!
//! The remote service is opaque: we send a prompt and expect the fixed
//! `MarketReport` shape back. All calls go through `llm_client`.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::market::prompts::{build_market_prompt, MARKET_INTEL_SYSTEM};

/// Used when the caller doesn't say where they are looking.
pub const ANY_LOCATION: &str = "Remote / any location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringTrend {
    Growing,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
    pub currency: String,
}

/// Exactly what the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub demand_level: DemandLevel,
    pub salary_range: SalaryRange,
    pub top_skills: Vec<String>,
    pub hiring_trend: HiringTrend,
    pub summary: String,
}

/// `MarketReport` tagged with the query it answers.
#[derive(Debug, Clone, Serialize)]
pub struct MarketInsights {
    pub role: String,
    pub location: String,
    #[serde(flatten)]
    pub report: MarketReport,
}

#[derive(Clone)]
pub struct MarketIntelClient {
    llm: LlmClient,
}

impl MarketIntelClient {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn fetch(&self, role: &str, location: Option<&str>) -> Result<MarketInsights, AppError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("role cannot be empty".to_string()));
        }
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(ANY_LOCATION);

        let prompt = build_market_prompt(role, location);
        let report: MarketReport = self
            .llm
            .call_json(&prompt, MARKET_INTEL_SYSTEM)
            .await
            .map_err(|e| AppError::MarketIntel(format!("Market report for '{role}' failed: {e}")))?;

        info!("Fetched market report for role '{role}' in '{location}'");

        Ok(MarketInsights {
            role: role.to_string(),
            location: location.to_string(),
            report: sanitize(report),
        })
    }
}

/// Keeps the report self-consistent whatever the model sent.
fn sanitize(mut report: MarketReport) -> MarketReport {
    let range = &mut report.salary_range;
    if range.min > range.max {
        std::mem::swap(&mut range.min, &mut range.max);
    }
    report.top_skills.retain(|s| !s.trim().is_empty());
    report.summary = report.summary.trim().to_string();
    report
}
