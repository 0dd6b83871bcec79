//! Funnel Aggregator: one bucket per pipeline stage, plus overall conversion rates.

use serde::{Deserialize, Serialize};

use crate::analytics::normalize::{JobRecord, JobStatus};
use crate::analytics::percent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: JobStatus,
    pub count: usize,
}

/// Stage counts in canonical order. Every record lands in exactly one bucket,
/// so the counts always sum to `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSnapshot {
    pub stages: Vec<StageCount>,
    pub total: usize,
}

impl FunnelSnapshot {
    pub fn count(&self, stage: JobStatus) -> usize {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.count)
            .unwrap_or(0)
    }
}

/// Pipeline-wide conversion, computed over applications only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRates {
    pub applications: usize,
    pub responded: usize,
    pub response_rate: u32,
    pub interview_rate: u32,
    pub offer_rate: u32,
}

pub fn build_funnel(records: &[JobRecord]) -> FunnelSnapshot {
    let mut counts = [0usize; JobStatus::ALL.len()];
    for record in records {
        let idx = JobStatus::ALL
            .iter()
            .position(|s| *s == record.status)
            .unwrap_or(JobStatus::ALL.len() - 1);
        counts[idx] += 1;
    }

    FunnelSnapshot {
        stages: JobStatus::ALL
            .iter()
            .zip(counts)
            .map(|(stage, count)| StageCount {
                stage: *stage,
                count,
            })
            .collect(),
        total: records.len(),
    }
}

/// Response, interview and offer rates as integer percents of applications.
pub fn conversion_rates(records: &[JobRecord]) -> ConversionRates {
    let applications: Vec<&JobRecord> = records.iter().filter(|r| r.is_application()).collect();
    let total = applications.len();

    let responded = applications
        .iter()
        .filter(|r| r.response_date.is_some())
        .count();
    let interviews = applications
        .iter()
        .filter(|r| r.status.reached_interview())
        .count();
    let offers = applications
        .iter()
        .filter(|r| r.status == JobStatus::Offer)
        .count();

    ConversionRates {
        applications: total,
        responded,
        response_rate: percent(responded, total),
        interview_rate: percent(interviews, total),
        offer_rate: percent(offers, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::normalize::normalize_records;
    use crate::models::job::RawJobRecord;

    fn raw(id: usize, status: Option<&str>) -> RawJobRecord {
        RawJobRecord {
            id: format!("job-{id}"),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_mixed_statuses_with_missing() {
        let mut raws = Vec::new();
        for i in 0..4 {
            raws.push(raw(i, Some("Applied")));
        }
        for i in 4..7 {
            raws.push(raw(i, Some("Interview")));
        }
        for i in 7..10 {
            raws.push(raw(i, None));
        }

        let funnel = build_funnel(&normalize_records(&raws));
        assert_eq!(funnel.count(JobStatus::Applied), 4);
        assert_eq!(funnel.count(JobStatus::Interview), 3);
        assert_eq!(funnel.count(JobStatus::Unknown), 3);
        assert_eq!(funnel.count(JobStatus::Offer), 0);
        assert_eq!(funnel.total, 10);
    }

    #[test]
    fn test_counts_sum_to_input_length() {
        let raws: Vec<_> = ["Offer", "offer", "Rejected", "", "Phone Screen", "Interested"]
            .iter()
            .enumerate()
            .map(|(i, s)| raw(i, Some(s)))
            .collect();
        let funnel = build_funnel(&normalize_records(&raws));
        let sum: usize = funnel.stages.iter().map(|s| s.count).sum();
        assert_eq!(sum, raws.len());
        assert_eq!(funnel.count(JobStatus::Unknown), 2);
    }

    #[test]
    fn test_empty_funnel_has_every_stage_at_zero() {
        let funnel = build_funnel(&[]);
        assert_eq!(funnel.stages.len(), JobStatus::ALL.len());
        assert!(funnel.stages.iter().all(|s| s.count == 0));
        assert_eq!(funnel.total, 0);
    }

    #[test]
    fn test_stage_order_is_canonical() {
        let funnel = build_funnel(&[]);
        let order: Vec<_> = funnel.stages.iter().map(|s| s.stage).collect();
        assert_eq!(order, JobStatus::ALL.to_vec());
    }

    #[test]
    fn test_conversion_rates() {
        let mut raws = vec![
            raw(0, Some("Applied")),
            raw(1, Some("Interview")),
            raw(2, Some("Offer")),
            raw(3, Some("Rejected")),
            raw(4, Some("Interested")),
        ];
        raws[1].response_date = Some("2024-02-01".to_string());
        raws[2].response_date = Some("2024-02-03".to_string());

        let rates = conversion_rates(&normalize_records(&raws));
        assert_eq!(rates.applications, 4);
        assert_eq!(rates.responded, 2);
        assert_eq!(rates.response_rate, 50);
        assert_eq!(rates.interview_rate, 50);
        assert_eq!(rates.offer_rate, 25);
    }

    #[test]
    fn test_conversion_rates_empty_is_zero() {
        let rates = conversion_rates(&[]);
        assert_eq!(rates.applications, 0);
        assert_eq!(rates.response_rate, 0);
        assert_eq!(rates.offer_rate, 0);
    }
}
