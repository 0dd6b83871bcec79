//! Record source: where the engine's input snapshot comes from.
//!
//! The engine only ever sees `&[RawJobRecord]`; `AppState` carries an
//! `Arc<dyn JobRecordSource>` so handlers never depend on the storage backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::job::RawJobRecord;

#[async_trait]
pub trait JobRecordSource: Send + Sync {
    /// Returns every job the user is tracking, in no particular order.
    async fn fetch_records(&self, user_id: Uuid) -> Result<Vec<RawJobRecord>>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

/// Reads the `jobs` table. Timestamps are rendered as text on purpose: the
/// analytics normalizer is the single place that parses dates.
pub struct PgJobSource {
    pool: PgPool,
}

impl PgJobSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRecordSource for PgJobSource {
    async fn fetch_records(&self, user_id: Uuid) -> Result<Vec<RawJobRecord>> {
        let records = sqlx::query_as::<_, RawJobRecord>(
            r#"
            SELECT
                id::text                   AS id,
                status,
                created_at::text           AS created_at,
                applied_date::text         AS applied_date,
                response_date::text        AS response_date,
                interview_date::text       AS interview_date,
                status_changed_at::text    AS status_changed_at,
                application_deadline::text AS application_deadline,
                company_size,
                industry,
                job_type,
                application_method,
                location
            FROM jobs
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load jobs for user {user_id}"))?;

        debug!("Loaded {} job records for user {user_id}", records.len());
        Ok(records)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory (tests)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub struct InMemoryJobSource {
    pub records: std::collections::HashMap<Uuid, Vec<RawJobRecord>>,
}

#[cfg(test)]
#[async_trait]
impl JobRecordSource for InMemoryJobSource {
    async fn fetch_records(&self, user_id: Uuid) -> Result<Vec<RawJobRecord>> {
        Ok(self.records.get(&user_id).cloned().unwrap_or_default())
    }
}
