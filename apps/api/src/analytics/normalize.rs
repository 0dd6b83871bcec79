//! Record Normalizer: coerces raw, user-entered job rows into `JobRecord`s.
//!
//! This is the only place dates are parsed. Every other analytics module works on
//! `Option<DateTime<Utc>>` and never sees raw strings.
//!
//! Malformed fields are defaulted one at a time; a record is never dropped.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::RawJobRecord;

/// Formats carrying an explicit offset (PostgreSQL `timestamptz::text` among them).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Offset-less formats, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// All-digit lengths read as epoch time: seconds and milliseconds.
const EPOCH_SECONDS_DIGITS: usize = 10;
const EPOCH_MILLIS_DIGITS: usize = 13;

/// Parsed timestamps outside these years are treated as data-entry errors.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

// ────────────────────────────────────────────────────────────────────────────
// Status
// ────────────────────────────────────────────────────────────────────────────

/// Pipeline stage a job currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobStatus {
    Interested,
    Applied,
    #[serde(rename = "Phone Screen")]
    PhoneScreen,
    Interview,
    Offer,
    Rejected,
    Unknown,
}

impl JobStatus {
    /// Canonical funnel order. `Unknown` is always last.
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Interested,
        JobStatus::Applied,
        JobStatus::PhoneScreen,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
        JobStatus::Unknown,
    ];

    /// Case-sensitive match against the stage labels. Anything else is `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Interested") => JobStatus::Interested,
            Some("Applied") => JobStatus::Applied,
            Some("Phone Screen") => JobStatus::PhoneScreen,
            Some("Interview") => JobStatus::Interview,
            Some("Offer") => JobStatus::Offer,
            Some("Rejected") => JobStatus::Rejected,
            _ => JobStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Interested => "Interested",
            JobStatus::Applied => "Applied",
            JobStatus::PhoneScreen => "Phone Screen",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
            JobStatus::Unknown => "Unknown",
        }
    }

    /// True once the user has acted on the job (applied or beyond, terminal included).
    pub fn is_past_interested(self) -> bool {
        matches!(
            self,
            JobStatus::Applied
                | JobStatus::PhoneScreen
                | JobStatus::Interview
                | JobStatus::Offer
                | JobStatus::Rejected
        )
    }

    /// Reached the interview stage (offers included).
    pub fn reached_interview(self) -> bool {
        matches!(self, JobStatus::Interview | JobStatus::Offer)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Categorical attributes
// ────────────────────────────────────────────────────────────────────────────

/// Categorical attribute a job can be segmented by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    CompanySize,
    Industry,
    JobType,
    ApplicationMethod,
    Location,
}

impl Attribute {
    /// Order in which the full segmented report is composed.
    pub const ALL: [Attribute; 5] = [
        Attribute::CompanySize,
        Attribute::Industry,
        Attribute::JobType,
        Attribute::ApplicationMethod,
        Attribute::Location,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::CompanySize => "company_size",
            Attribute::Industry => "industry",
            Attribute::JobType => "job_type",
            Attribute::ApplicationMethod => "application_method",
            Attribute::Location => "location",
        }
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown attribute '{s}' (expected one of: {})",
                    Attribute::ALL.map(Attribute::as_str).join(", ")
                )
            })
    }
}

/// A non-blank categorical value: `key` groups, `label` displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub key: String,
    pub label: String,
}

impl AttributeValue {
    /// Trims the raw value; blank input yields `None`.
    pub fn from_raw(raw: Option<&str>) -> Option<Self> {
        let label = raw?.trim();
        if label.is_empty() {
            return None;
        }
        Some(AttributeValue {
            key: segment_key(label),
            label: label.to_string(),
        })
    }
}

/// Grouping key for a categorical value: trimmed and lower-cased.
pub fn segment_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub applied_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub interview_date: Option<DateTime<Utc>>,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub company_size: Option<AttributeValue>,
    pub industry: Option<AttributeValue>,
    pub job_type: Option<AttributeValue>,
    pub application_method: Option<AttributeValue>,
    pub location: Option<AttributeValue>,
}

impl JobRecord {
    pub fn attribute(&self, attribute: Attribute) -> Option<&AttributeValue> {
        match attribute {
            Attribute::CompanySize => self.company_size.as_ref(),
            Attribute::Industry => self.industry.as_ref(),
            Attribute::JobType => self.job_type.as_ref(),
            Attribute::ApplicationMethod => self.application_method.as_ref(),
            Attribute::Location => self.location.as_ref(),
        }
    }

    /// A record counts as an application once it has an applied date or a status
    /// past `Interested`.
    pub fn is_application(&self) -> bool {
        self.applied_date.is_some() || self.status.is_past_interested()
    }
}

/// Normalizes one raw record. Never fails.
pub fn normalize_record(raw: &RawJobRecord) -> JobRecord {
    let ts = |field: &Option<String>| field.as_deref().and_then(parse_timestamp);
    let attr = |field: &Option<String>| AttributeValue::from_raw(field.as_deref());

    JobRecord {
        id: raw.id.clone(),
        status: JobStatus::parse(raw.status.as_deref()),
        created_at: ts(&raw.created_at),
        applied_date: ts(&raw.applied_date),
        response_date: ts(&raw.response_date),
        interview_date: ts(&raw.interview_date),
        status_changed_at: ts(&raw.status_changed_at),
        application_deadline: ts(&raw.application_deadline),
        company_size: attr(&raw.company_size),
        industry: attr(&raw.industry),
        job_type: attr(&raw.job_type),
        application_method: attr(&raw.application_method),
        location: attr(&raw.location),
    }
}

/// Normalizes every raw record, preserving input order and length.
pub fn normalize_records(raw: &[RawJobRecord]) -> Vec<JobRecord> {
    raw.iter().map(normalize_record).collect()
}

/// Parses a user-entered timestamp into UTC.
///
/// Accepted, in order: epoch seconds (10 digits) or milliseconds (13 digits),
/// RFC 3339, timestamps with an offset, naive date-times, `YYYY-MM-DD`, and
/// `YYYY-MM` (first day of month). Signed years and years outside
/// `MIN_YEAR..=MAX_YEAR` are rejected. Returns `None` on anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with(['+', '-']) {
        return None;
    }
    parse_any(s).filter(|dt| (MIN_YEAR..=MAX_YEAR).contains(&dt.year()))
}

fn parse_any(s: &str) -> Option<DateTime<Utc>> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let n = s.parse::<i64>().ok()?;
        return match s.len() {
            EPOCH_SECONDS_DIGITS => DateTime::from_timestamp(n, 0),
            EPOCH_MILLIS_DIGITS => DateTime::from_timestamp_millis(n),
            _ => None,
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()?;
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
