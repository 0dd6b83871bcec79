//! Segmentation Engine: response/offer statistics per value of one categorical attribute.
//!
//! Invoked once per attribute; `segment_all` composes the full report in the
//! fixed `Attribute::ALL` order.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analytics::normalize::{segment_key, Attribute, JobRecord, JobStatus};
use crate::analytics::{mean_days, percent, whole_days_between};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub category: Attribute,
    pub value: String,
    pub total: usize,
    pub responded: usize,
    pub offers: usize,
    pub response_rate: u32,
    pub offer_rate: u32,
    pub avg_days_to_response: f64,
}

#[derive(Default)]
struct Accumulator<'a> {
    label: Option<&'a str>,
    total: usize,
    responded: usize,
    offers: usize,
    response_days: Vec<i64>,
}

/// Segments `records` by `attribute`.
///
/// When `allowed_values` is given only those values (matched case-insensitively
/// after trimming) are reported. Records with a blank value are skipped.
///
/// Ordering: `response_rate` desc, then `total` desc, then value key asc.
pub fn segment(
    records: &[JobRecord],
    attribute: Attribute,
    allowed_values: Option<&[String]>,
) -> Vec<Segment> {
    let allowed: Option<HashSet<String>> =
        allowed_values.map(|values| values.iter().map(|v| segment_key(v)).collect());

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in records {
        let Some(value) = record.attribute(attribute) else {
            continue;
        };
        if let Some(allowed) = &allowed {
            if !allowed.contains(&value.key) {
                continue;
            }
        }

        let acc = groups.entry(value.key.as_str()).or_default();
        // Smallest label wins so that input order never changes the display value.
        acc.label = match acc.label {
            Some(existing) if existing <= value.label.as_str() => Some(existing),
            _ => Some(value.label.as_str()),
        };
        acc.total += 1;
        if record.status == JobStatus::Offer {
            acc.offers += 1;
        }
        if let Some(response) = record.response_date {
            acc.responded += 1;
            if let Some(days) = record
                .applied_date
                .and_then(|applied| whole_days_between(applied, response))
            {
                acc.response_days.push(days);
            }
        }
    }

    let mut segments: Vec<(&str, Segment)> = groups
        .into_iter()
        .filter(|(_, acc)| acc.total > 0)
        .map(|(key, acc)| {
            let segment = Segment {
                category: attribute,
                value: acc.label.unwrap_or(key).to_string(),
                total: acc.total,
                responded: acc.responded,
                offers: acc.offers,
                response_rate: percent(acc.responded, acc.total),
                offer_rate: percent(acc.offers, acc.total),
                avg_days_to_response: mean_days(&acc.response_days),
            };
            (key, segment)
        })
        .collect();

    segments.sort_by(|(key_a, a), (key_b, b)| {
        b.response_rate
            .cmp(&a.response_rate)
            .then(b.total.cmp(&a.total))
            .then(key_a.cmp(key_b))
    });

    segments.into_iter().map(|(_, s)| s).collect()
}

/// Concatenates the per-attribute reports for every known attribute.
pub fn segment_all(records: &[JobRecord]) -> Vec<Segment> {
    Attribute::ALL
        .iter()
        .flat_map(|attribute| segment(records, *attribute, None))
        .collect()
}

/// Highest response-rate segment for `attribute` with at least `min_total` records.
pub fn best_segment(
    segments: &[Segment],
    attribute: Attribute,
    min_total: usize,
) -> Option<&Segment> {
    // Segments are already ranked, so the first qualifying one is the best.
    segments
        .iter()
        .find(|s| s.category == attribute && s.total >= min_total)
}
