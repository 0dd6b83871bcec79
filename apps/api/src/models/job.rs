use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked job exactly as it comes back from the data source.
///
/// Every field except `id` is optional user-entered text. Timestamp columns are
/// selected as text so that the analytics normalizer owns all date parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct RawJobRecord {
    pub id: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub applied_date: Option<String>,
    pub response_date: Option<String>,
    pub interview_date: Option<String>,
    pub status_changed_at: Option<String>,
    pub application_deadline: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub job_type: Option<String>,
    pub application_method: Option<String>,
    pub location: Option<String>,
}
