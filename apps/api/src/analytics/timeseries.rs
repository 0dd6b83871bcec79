//! Time-Series Binner: fixed trailing window of calendar buckets, zero-filled.
//!
//! Buckets are derived from the window, not from the data: a period with no
//! records is still emitted with `count = 0`, and records outside the window
//! are dropped rather than clipped into the first or last bucket.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::normalize::JobRecord;
use crate::analytics::percent;

/// Trailing buckets (current included) in the rolling response rate.
const ROLLING_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(format!(
                "unknown granularity '{other}' (expected 'week' or 'month')"
            )),
        }
    }
}

/// Which timestamp places a record in a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// When the job was first tracked.
    CreatedAt,
    /// When the application went out.
    AppliedDate,
}

impl DateField {
    fn pick(self, record: &JobRecord) -> Option<DateTime<Utc>> {
        match self {
            DateField::CreatedAt => record.created_at,
            DateField::AppliedDate => record.applied_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// `YYYY-MM` for months, ISO `YYYY-Www` for weeks.
    pub period_label: String,
    pub period_start: NaiveDate,
    pub count: usize,
    pub responded: usize,
    pub response_rate: u32,
    pub rolling_response_rate: u32,
}

/// First day of the period containing `date`. Weeks start on Monday.
///
/// `None` when that day falls before the earliest representable date.
pub fn period_start(date: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Week => date.checked_sub_signed(Duration::days(i64::from(
            date.weekday().num_days_from_monday(),
        ))),
        Granularity::Month => date.with_day(1),
    }
}

pub fn period_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Week => {
            let iso = start.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Month => format!("{}-{:02}", start.year(), start.month()),
    }
}

/// Months since year 0: makes month arithmetic plain integer math.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn month_from_index(index: i64) -> Option<NaiveDate> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(index.rem_euclid(12)).ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Position of `date`'s period relative to `first`, the window's first period.
fn offset_from(first: NaiveDate, date: NaiveDate, granularity: Granularity) -> Option<i64> {
    match granularity {
        Granularity::Week => {
            let start = period_start(date, granularity)?;
            Some(start.signed_duration_since(first).num_days().div_euclid(7))
        }
        Granularity::Month => Some(month_index(date) - month_index(first)),
    }
}

fn nth_period(first: NaiveDate, n: usize, granularity: Granularity) -> Option<NaiveDate> {
    let n = i64::try_from(n).ok()?;
    match granularity {
        Granularity::Week => first.checked_add_signed(Duration::weeks(n)),
        Granularity::Month => month_from_index(month_index(first) + n),
    }
}

/// Buckets `records` into the `window_size` periods ending at the one containing `as_of`.
pub fn bucket_by_period(
    records: &[JobRecord],
    granularity: Granularity,
    window_size: usize,
    date_field: DateField,
    as_of: DateTime<Utc>,
) -> Vec<TimeBucket> {
    if window_size == 0 {
        return Vec::new();
    }

    let Some(current) = period_start(as_of.date_naive(), granularity) else {
        return Vec::new();
    };
    let span = i64::try_from(window_size - 1).unwrap_or(i64::MAX);
    let first = match granularity {
        Granularity::Week => current.checked_sub_signed(Duration::weeks(span)),
        Granularity::Month => month_from_index(month_index(current) - span),
    };
    let Some(first) = first else {
        return Vec::new();
    };

    let mut counts = vec![0usize; window_size];
    let mut responded = vec![0usize; window_size];

    for record in records {
        let Some(ts) = date_field.pick(record) else {
            continue;
        };
        let Some(offset) = offset_from(first, ts.date_naive(), granularity) else {
            continue;
        };
        let Ok(idx) = usize::try_from(offset) else {
            continue;
        };
        if idx >= window_size {
            continue;
        }
        counts[idx] += 1;
        if record.response_date.is_some() {
            responded[idx] += 1;
        }
    }

    (0..window_size)
        .map_while(|i| {
            let start = nth_period(first, i, granularity)?;
            let lo = (i + 1).saturating_sub(ROLLING_WINDOW);
            let rolling_count: usize = counts[lo..=i].iter().sum();
            let rolling_responded: usize = responded[lo..=i].iter().sum();
            Some(TimeBucket {
                period_label: period_label(start, granularity),
                period_start: start,
                count: counts[i],
                responded: responded[i],
                response_rate: percent(responded[i], counts[i]),
                rolling_response_rate: percent(rolling_responded, rolling_count),
            })
        })
        .collect()
}

/// Number of records whose `date_field` falls in the period containing `as_of`.
pub fn count_in_current_period(
    records: &[JobRecord],
    granularity: Granularity,
    date_field: DateField,
    as_of: DateTime<Utc>,
) -> usize {
    bucket_by_period(records, granularity, 1, date_field, as_of)
        .first()
        .map(|b| b.count)
        .unwrap_or(0)
}
