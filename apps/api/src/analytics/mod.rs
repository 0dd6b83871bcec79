// Analytics engine: turns a user's tracked jobs into pipeline metrics.
// Implements: normalization, funnel, segmentation, time series, durations, heuristics.
// Everything here except `handlers` and `source` is pure, synchronous, and I/O free.

pub mod durations;
pub mod export;
pub mod funnel;
pub mod handlers;
pub mod normalize;
pub mod recommendations;
pub mod segmentation;
pub mod source;
pub mod timeseries;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::durations::{
    deadline_adherence, stage_durations, time_to_offer, DeadlineAdherence, StageDuration,
    TimeToOffer,
};
use crate::analytics::funnel::{build_funnel, conversion_rates, ConversionRates, FunnelSnapshot};
use crate::analytics::normalize::{normalize_records, Attribute};
use crate::analytics::recommendations::{recommend, RecommendationMetrics, MIN_SEGMENT_SIZE};
use crate::analytics::segmentation::{best_segment, segment_all, Segment};
use crate::analytics::timeseries::{
    bucket_by_period, count_in_current_period, DateField, Granularity, TimeBucket,
};
use crate::models::job::RawJobRecord;

/// Caller-supplied knobs. Nothing is read from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    /// "Now" for the trailing time-series window.
    pub as_of: DateTime<Utc>,
    pub granularity: Granularity,
    pub window_size: usize,
    pub weekly_goal: u32,
}

/// Full analytics report for one record snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub as_of: DateTime<Utc>,
    pub granularity: Granularity,
    pub total_records: usize,
    pub funnel: FunnelSnapshot,
    pub conversion: ConversionRates,
    pub segments: Vec<Segment>,
    /// Applications sent per period.
    pub application_trend: Vec<TimeBucket>,
    /// Jobs added to the tracker per period.
    pub tracking_trend: Vec<TimeBucket>,
    pub stage_durations: Vec<StageDuration>,
    pub time_to_offer: TimeToOffer,
    pub deadline_adherence: DeadlineAdherence,
    pub applications_this_week: usize,
    pub weekly_goal: u32,
    pub recommendations: Vec<String>,
}

/// Normalizes `raw` once and runs every aggregator over the result.
pub fn compute_snapshot(raw: &[RawJobRecord], options: &AnalyticsOptions) -> AnalyticsSnapshot {
    let records = normalize_records(raw);

    let funnel = build_funnel(&records);
    let conversion = conversion_rates(&records);
    let segments = segment_all(&records);
    let application_trend = bucket_by_period(
        &records,
        options.granularity,
        options.window_size,
        DateField::AppliedDate,
        options.as_of,
    );
    let tracking_trend = bucket_by_period(
        &records,
        options.granularity,
        options.window_size,
        DateField::CreatedAt,
        options.as_of,
    );
    let stage_durations = stage_durations(&records);
    let time_to_offer = time_to_offer(&records);
    let deadline_adherence = deadline_adherence(&records);
    let applications_this_week = count_in_current_period(
        &records,
        Granularity::Week,
        DateField::AppliedDate,
        options.as_of,
    );

    let recommendations = recommend(&RecommendationMetrics {
        total_records: records.len(),
        funnel: &funnel,
        conversion: &conversion,
        deadline_adherence: &deadline_adherence,
        time_to_offer: &time_to_offer,
        weekly_goal: options.weekly_goal,
        applications_this_week,
        best_channel: best_segment(&segments, Attribute::ApplicationMethod, MIN_SEGMENT_SIZE),
    });

    debug!(
        records = records.len(),
        segments = segments.len(),
        recommendations = recommendations.len(),
        "Computed analytics snapshot"
    );

    AnalyticsSnapshot {
        as_of: options.as_of,
        granularity: options.granularity,
        total_records: records.len(),
        funnel,
        conversion,
        segments,
        application_trend,
        tracking_trend,
        stage_durations,
        time_to_offer,
        deadline_adherence,
        applications_this_week,
        weekly_goal: options.weekly_goal,
        recommendations,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared arithmetic
// ────────────────────────────────────────────────────────────────────────────

/// `part / whole` as a rounded integer percent; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole days from `from` to `to`; `None` when `to` precedes `from`.
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<i64> {
    let elapsed = to.signed_duration_since(from);
    (elapsed >= chrono::Duration::zero()).then(|| elapsed.num_days())
}

/// Mean of day samples rounded to one decimal, 0 for no samples.
pub fn mean_days(samples: &[i64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: i64 = samples.iter().sum();
    round_to_tenth(sum as f64 / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::analytics::normalize::JobStatus;

    fn options() -> AnalyticsOptions {
        AnalyticsOptions {
            as_of: Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap(),
            granularity: Granularity::Month,
            window_size: 12,
            weekly_goal: 5,
        }
    }

    fn job(id: usize, status: &str, method: &str, applied: &str, response: Option<&str>) -> RawJobRecord {
        RawJobRecord {
            id: format!("job-{id}"),
            status: Some(status.to_string()),
            created_at: Some(applied.to_string()),
            applied_date: Some(applied.to_string()),
            response_date: response.map(str::to_string),
            application_method: Some(method.to_string()),
            company_size: Some(if id % 2 == 0 { "Small (1-50)" } else { "Large (1000+)" }.to_string()),
            ..Default::default()
        }
    }

    fn sample() -> Vec<RawJobRecord> {
        vec![
            job(0, "Applied", "LinkedIn", "2024-03-11", None),
            job(1, "Phone Screen", "Referral", "2024-02-01", Some("2024-02-05")),
            job(2, "Interview", "Referral", "2024-01-10", Some("2024-01-12")),
            job(3, "Rejected", "LinkedIn", "2023-12-01", Some("2023-12-20")),
            job(4, "Offer", "Referral", "2023-11-15", Some("2023-11-18")),
            job(5, "bogus", "Company Site", "garbage", None),
        ]
    }

    #[test]
    fn test_empty_snapshot_is_well_formed() {
        let snapshot = compute_snapshot(&[], &options());
        assert_eq!(snapshot.total_records, 0);
        assert_eq!(snapshot.funnel.total, 0);
        assert!(snapshot.funnel.stages.iter().all(|s| s.count == 0));
        assert!(snapshot.segments.is_empty());
        assert_eq!(snapshot.application_trend.len(), 12);
        assert!(snapshot.application_trend.iter().all(|b| b.count == 0));
        assert_eq!(snapshot.tracking_trend.len(), 12);
        assert_eq!(snapshot.time_to_offer.avg_days, 0.0);
        assert_eq!(snapshot.deadline_adherence.ratio, 0.0);
        assert!(!snapshot.recommendations.is_empty());
        assert!(snapshot.recommendations[0].starts_with("Start tracking"));
    }

    #[test]
    fn test_snapshot_aggregates() {
        let snapshot = compute_snapshot(&sample(), &options());
        assert_eq!(snapshot.total_records, 6);
        assert_eq!(snapshot.funnel.count(JobStatus::Unknown), 1);
        assert_eq!(snapshot.applications_this_week, 1);

        let referral = snapshot
            .segments
            .iter()
            .find(|s| s.category == Attribute::ApplicationMethod && s.value == "Referral")
            .unwrap();
        assert_eq!(referral.total, 3);
        assert_eq!(referral.responded, 3);
        assert_eq!(referral.response_rate, 100);
        assert_eq!(referral.offers, 1);

        assert!(snapshot
            .recommendations
            .iter()
            .any(|r| r.contains("\"Referral\"")));
        assert!(snapshot.recommendations.len() <= recommendations::MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_snapshot_idempotent() {
        let raw = sample();
        assert_eq!(compute_snapshot(&raw, &options()), compute_snapshot(&raw, &options()));
    }

    #[test]
    fn test_snapshot_order_independent() {
        let raw = sample();
        let mut reversed = raw.clone();
        reversed.reverse();
        let mut rotated = raw.clone();
        rotated.rotate_left(2);

        let base = compute_snapshot(&raw, &options());
        assert_eq!(base, compute_snapshot(&reversed, &options()));
        assert_eq!(base, compute_snapshot(&rotated, &options()));
    }

    #[test]
    fn test_extreme_year_dates_do_not_break_snapshot() {
        let raw: Vec<RawJobRecord> = ["-262143-01-01", "-262143-01-02", "+2024-01-05"]
            .iter()
            .enumerate()
            .map(|(i, date)| RawJobRecord {
                id: format!("job-{i}"),
                status: Some("Applied".to_string()),
                created_at: Some(date.to_string()),
                applied_date: Some(date.to_string()),
                response_date: Some("2024-03-01".to_string()),
                company_size: Some("Startup".to_string()),
                ..Default::default()
            })
            .collect();

        for granularity in [Granularity::Week, Granularity::Month] {
            let snapshot = compute_snapshot(&raw, &AnalyticsOptions { granularity, ..options() });
            assert_eq!(snapshot.total_records, 3);
            assert_eq!(snapshot.applications_this_week, 0);
            assert!(snapshot.application_trend.iter().all(|b| b.count == 0));
            assert_eq!(snapshot.segments[0].avg_days_to_response, 0.0);
            assert_eq!(snapshot.stage_durations[1].samples, 0);
        }
    }

    #[test]
    fn test_percent_guards_zero() {
        assert_eq!(percent(3, 0), 0);
        assert_eq!(percent(2, 5), 40);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
    }

    #[test]
    fn test_whole_days_between() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 3, 11, 0, 0).unwrap();
        assert_eq!(whole_days_between(a, b), Some(1));
        assert_eq!(whole_days_between(b, a), None);
        assert_eq!(whole_days_between(a, a), Some(0));
    }

    #[test]
    fn test_mean_days() {
        assert_eq!(mean_days(&[]), 0.0);
        assert_eq!(mean_days(&[1, 2]), 1.5);
        assert_eq!(mean_days(&[1, 1, 2]), 1.3);
    }
}
