//! Export formatter: straight serializations of an `AnalyticsSnapshot`.
//!
//! CSV: a `Metric,Value` summary followed by one header row per section.
//! JSON: the snapshot wrapped with a `generated_at` timestamp, pretty-printed.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::analytics::AnalyticsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{other}' (expected 'csv' or 'json')")),
        }
    }
}

#[derive(Serialize)]
struct SnapshotExport<'a> {
    generated_at: DateTime<Utc>,
    snapshot: &'a AnalyticsSnapshot,
}

pub fn export(
    snapshot: &AnalyticsSnapshot,
    format: ExportFormat,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(snapshot, generated_at),
        ExportFormat::Json => to_json(snapshot, generated_at),
    }
}

pub fn to_json(snapshot: &AnalyticsSnapshot, generated_at: DateTime<Utc>) -> Result<String> {
    serde_json::to_string_pretty(&SnapshotExport {
        generated_at,
        snapshot,
    })
    .context("Failed to serialize analytics snapshot")
}

pub fn to_csv(snapshot: &AnalyticsSnapshot, generated_at: DateTime<Utc>) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let conversion = &snapshot.conversion;
    let adherence = &snapshot.deadline_adherence;
    let summary: Vec<(&str, String)> = vec![
        (
            "Generated At",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "As Of",
            snapshot.as_of.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("Total Records", snapshot.total_records.to_string()),
        ("Applications", conversion.applications.to_string()),
        ("Responded", conversion.responded.to_string()),
        ("Response Rate (%)", conversion.response_rate.to_string()),
        ("Interview Rate (%)", conversion.interview_rate.to_string()),
        ("Offer Rate (%)", conversion.offer_rate.to_string()),
        (
            "Avg Days To Offer",
            format!("{:.1}", snapshot.time_to_offer.avg_days),
        ),
        ("Deadlines Met", adherence.met.to_string()),
        ("Deadlines Missed", adherence.missed.to_string()),
        (
            "Deadline Adherence (%)",
            format!("{:.0}", adherence.ratio * 100.0),
        ),
        (
            "Applications This Week",
            snapshot.applications_this_week.to_string(),
        ),
        ("Weekly Goal", snapshot.weekly_goal.to_string()),
    ];

    wtr.write_record(["Metric", "Value"])?;
    for (metric, value) in &summary {
        wtr.write_record([*metric, value.as_str()])?;
    }

    wtr.write_record(["Stage", "Count"])?;
    for stage in &snapshot.funnel.stages {
        wtr.write_record([stage.stage.label(), stage.count.to_string().as_str()])?;
    }

    wtr.write_record([
        "Category",
        "Value",
        "Total",
        "Responded",
        "Offers",
        "Response Rate (%)",
        "Offer Rate (%)",
        "Avg Days To Response",
    ])?;
    for s in &snapshot.segments {
        wtr.write_record([
            s.category.as_str(),
            s.value.as_str(),
            s.total.to_string().as_str(),
            s.responded.to_string().as_str(),
            s.offers.to_string().as_str(),
            s.response_rate.to_string().as_str(),
            s.offer_rate.to_string().as_str(),
            format!("{:.1}", s.avg_days_to_response).as_str(),
        ])?;
    }

    wtr.write_record([
        "Period",
        "Applications",
        "Responded",
        "Response Rate (%)",
        "Rolling Response Rate (%)",
    ])?;
    for b in &snapshot.application_trend {
        wtr.write_record([
            b.period_label.as_str(),
            b.count.to_string().as_str(),
            b.responded.to_string().as_str(),
            b.response_rate.to_string().as_str(),
            b.rolling_response_rate.to_string().as_str(),
        ])?;
    }

    wtr.write_record(["Stage", "Avg Days", "Samples"])?;
    for d in &snapshot.stage_durations {
        wtr.write_record([
            d.stage.label(),
            format!("{:.1}", d.avg_days).as_str(),
            d.samples.to_string().as_str(),
        ])?;
    }

    wtr.write_record(["Recommendation"])?;
    for rec in &snapshot.recommendations {
        wtr.write_record([rec.as_str()])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV export: {e}"))?;
    String::from_utf8(bytes).context("CSV export was not valid UTF-8")
}
