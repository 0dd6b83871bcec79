//! Duration & Adherence Calculator: time spent per stage, time-to-offer, and
//! how often the user acted before an application deadline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::normalize::{JobRecord, JobStatus};
use crate::analytics::{mean_days, whole_days_between};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDuration {
    pub stage: JobStatus,
    pub avg_days: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeToOffer {
    pub avg_days: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineAdherence {
    pub met: usize,
    pub missed: usize,
    /// `met / (met + missed)`, 0 when no record carries a deadline.
    pub ratio: f64,
}

impl DeadlineAdherence {
    pub fn tracked(&self) -> usize {
        self.met + self.missed
    }
}

type Boundary = fn(&JobRecord) -> Option<DateTime<Utc>>;

/// Stage transitions as (stage, entered, left).
const STAGE_BOUNDARIES: &[(JobStatus, Boundary, Boundary)] = &[
    (JobStatus::Interested, |r| r.created_at, |r| r.applied_date),
    (JobStatus::Applied, |r| r.applied_date, |r| r.response_date),
    (JobStatus::PhoneScreen, |r| r.response_date, |r| r.interview_date),
    (JobStatus::Interview, |r| r.interview_date, decision_date),
];

/// When the interview stage ended: the status change that produced an offer or rejection.
fn decision_date(record: &JobRecord) -> Option<DateTime<Utc>> {
    match record.status {
        JobStatus::Offer | JobStatus::Rejected => record.status_changed_at,
        _ => None,
    }
}

/// Average whole days spent in each stage. A record contributes to a stage only
/// when both boundary timestamps exist and are in order.
pub fn stage_durations(records: &[JobRecord]) -> Vec<StageDuration> {
    STAGE_BOUNDARIES
        .iter()
        .map(|(stage, entered, left)| {
            let samples: Vec<i64> = records
                .iter()
                .filter_map(|r| whole_days_between(entered(r)?, left(r)?))
                .collect();
            StageDuration {
                stage: *stage,
                avg_days: mean_days(&samples),
                samples: samples.len(),
            }
        })
        .collect()
}

/// Mean days from application to the status change that made it an offer.
pub fn time_to_offer(records: &[JobRecord]) -> TimeToOffer {
    let samples: Vec<i64> = records
        .iter()
        .filter(|r| r.status == JobStatus::Offer)
        .filter_map(|r| whole_days_between(r.applied_date?, r.status_changed_at?))
        .collect();

    TimeToOffer {
        avg_days: mean_days(&samples),
        samples: samples.len(),
    }
}

/// Share of deadline-bearing records acted on by the deadline's calendar day.
///
/// Action timestamps are the applied date and, once the status is past
/// `Interested`, the status-change timestamp.
pub fn deadline_adherence(records: &[JobRecord]) -> DeadlineAdherence {
    let mut met = 0;
    let mut missed = 0;

    for record in records {
        let Some(deadline) = record.application_deadline else {
            continue;
        };
        let deadline_day = deadline.date_naive();

        let status_change = record
            .status_changed_at
            .filter(|_| record.status.is_past_interested());
        let acted_in_time = [record.applied_date, status_change]
            .into_iter()
            .flatten()
            .any(|ts| ts.date_naive() <= deadline_day);

        if acted_in_time {
            met += 1;
        } else {
            missed += 1;
        }
    }

    let tracked = met + missed;
    DeadlineAdherence {
        met,
        missed,
        ratio: if tracked > 0 {
            met as f64 / tracked as f64
        } else {
            0.0
        },
    }
}
