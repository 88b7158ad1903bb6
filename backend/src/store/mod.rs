//! Persistence collaborators
//!
//! The engine reads subjects, appends notification records and claims
//! alert-session fingerprints through these traits. Storage mechanics live in
//! the in-memory and PostgreSQL implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared::models::{LogSummary, NewNotification, NotificationRecord, Subject, SubjectCensus};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAlertSessions, MemoryNotificationLog, MemorySubjectStore};
pub use postgres::{PgAlertSessions, PgNotificationLog, PgSubjectStore};

/// Read access to registered farmers
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Option<Subject>>;

    /// All active subjects, oldest registration first
    async fn list_active(&self) -> AppResult<Vec<Subject>>;

    /// Subjects for the given ids in input order; unknown ids are left out
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>>;

    /// Active subjects at a pincode, optionally growing a given crop
    async fn find_by_location(&self, pincode: &str, crop: Option<&str>) -> AppResult<Vec<Subject>>;

    /// Registration counts over all subjects, `limit` entries per ranking
    async fn census(&self, limit: i64) -> AppResult<SubjectCensus>;
}

/// Append-only notification audit trail
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Persist one record; the returned record is immutable from here on
    async fn append(&self, notification: NewNotification) -> AppResult<NotificationRecord>;

    /// Totals by status and category, plus the count sent at or after `since`
    async fn summarize(&self, since: DateTime<Utc>) -> AppResult<LogSummary>;

    /// Most recent records, newest first
    async fn recent(&self, limit: i64) -> AppResult<Vec<NotificationRecord>>;
}

/// Tracks which alert fingerprints were already dispatched
#[async_trait]
pub trait AlertSessionStore: Send + Sync {
    /// Claim a fingerprint for a day; `true` only for the first claim
    async fn claim(&self, fingerprint: &str, subject_id: Uuid, day: NaiveDate) -> AppResult<bool>;

    /// Give a claimed fingerprint back so a later evaluation can retry it
    async fn release(&self, fingerprint: &str, day: NaiveDate) -> AppResult<()>;
}

/// Reorder `subjects` to follow `ids`, dropping ids with no subject
pub(crate) fn in_input_order(ids: &[Uuid], subjects: Vec<Subject>) -> Vec<Subject> {
    let mut found: std::collections::HashMap<Uuid, Subject> =
        subjects.into_iter().map(|s| (s.id, s)).collect();
    ids.iter().filter_map(|id| found.remove(id)).collect()
}
