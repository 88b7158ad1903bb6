//! PostgreSQL collaborators backed by sqlx

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{
    CategoryCount, GroupCount, LogSummary, NewNotification, NotificationRecord,
    RecentRegistration, Subject, SubjectCensus,
};
use shared::{DeliveryStatus, MessageCategory, SoilHealth, SoilType};

use super::{in_input_order, AlertSessionStore, NotificationLog, SubjectStore};
use crate::error::{AppError, AppResult};

fn parse_column<T>(column: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::Persistence(format!("bad {} value: {}", column, e)))
}

// ============================================================================
// Subjects
// ============================================================================

#[derive(Debug, FromRow)]
struct FarmerRow {
    id: Uuid,
    name: String,
    mobile_number: String,
    pincode: String,
    crop_name: String,
    soil_type: String,
    soil_health: String,
    seed_sowing_date: NaiveDate,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<FarmerRow> for Subject {
    type Error = AppError;

    fn try_from(row: FarmerRow) -> AppResult<Self> {
        Ok(Subject {
            id: row.id,
            name: row.name,
            mobile_number: row.mobile_number,
            pincode: row.pincode,
            crop_name: row.crop_name,
            soil_type: parse_column::<SoilType>("soil_type", &row.soil_type)?,
            soil_health: parse_column::<SoilHealth>("soil_health", &row.soil_health)?,
            seed_sowing_date: row.seed_sowing_date,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

fn into_subjects(rows: Vec<FarmerRow>) -> AppResult<Vec<Subject>> {
    rows.into_iter().map(Subject::try_from).collect()
}

const FARMER_COLUMNS: &str = "id, name, mobile_number, pincode, crop_name, soil_type, \
     soil_health, seed_sowing_date, is_active, created_at";

#[derive(Clone)]
pub struct PgSubjectStore {
    db: PgPool,
}

impl PgSubjectStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubjectStore for PgSubjectStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Subject>> {
        let row = sqlx::query_as::<_, FarmerRow>(&format!(
            "SELECT {} FROM farmers WHERE id = $1",
            FARMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Subject::try_from).transpose()
    }

    async fn list_active(&self) -> AppResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, FarmerRow>(&format!(
            "SELECT {} FROM farmers WHERE is_active ORDER BY created_at",
            FARMER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        into_subjects(rows)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, FarmerRow>(&format!(
            "SELECT {} FROM farmers WHERE id = ANY($1)",
            FARMER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(in_input_order(ids, into_subjects(rows)?))
    }

    async fn find_by_location(&self, pincode: &str, crop: Option<&str>) -> AppResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, FarmerRow>(&format!(
            r#"
            SELECT {} FROM farmers
            WHERE is_active
              AND pincode = $1
              AND ($2::text IS NULL OR lower(crop_name) = lower($2))
            ORDER BY created_at
            "#,
            FARMER_COLUMNS
        ))
        .bind(pincode)
        .bind(crop)
        .fetch_all(&self.db)
        .await?;

        into_subjects(rows)
    }

    async fn census(&self, limit: i64) -> AppResult<SubjectCensus> {
        let (total, active) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM farmers",
        )
        .fetch_one(&self.db)
        .await?;

        let recent = sqlx::query_as::<_, (String, String, String, DateTime<Utc>)>(
            r#"
            SELECT name, crop_name, pincode, created_at FROM farmers
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(SubjectCensus {
            total,
            active,
            recent_registrations: recent
                .into_iter()
                .map(|(name, crop_name, pincode, created_at)| RecentRegistration {
                    name,
                    crop_name,
                    pincode,
                    created_at,
                })
                .collect(),
            top_crops: self.top_groups("crop_name", limit).await?,
            top_pincodes: self.top_groups("pincode", limit).await?,
        })
    }
}

impl PgSubjectStore {
    /// Most common values of a farmers column, ties broken by value
    async fn top_groups(&self, column: &'static str, limit: i64) -> AppResult<Vec<GroupCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&format!(
            r#"
            SELECT {0}::text, COUNT(*) FROM farmers
            GROUP BY {0}
            ORDER BY COUNT(*) DESC, {0}
            LIMIT $1
            "#,
            column
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| GroupCount { name, count })
            .collect())
    }
}

// ============================================================================
// Notification log
// ============================================================================

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    farmer_id: Uuid,
    farmer_name: String,
    farmer_phone: String,
    message: String,
    message_type: String,
    status: String,
    provider_ref: Option<String>,
    sent_at: DateTime<Utc>,
    delivery_time: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for NotificationRecord {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> AppResult<Self> {
        Ok(NotificationRecord {
            id: row.id,
            farmer_id: row.farmer_id,
            farmer_name: row.farmer_name,
            farmer_phone: row.farmer_phone,
            message: row.message,
            message_type: parse_column::<MessageCategory>("message_type", &row.message_type)?,
            status: parse_column::<DeliveryStatus>("status", &row.status)?,
            provider_ref: row.provider_ref,
            sent_at: row.sent_at,
            delivery_time: row.delivery_time,
        })
    }
}

#[derive(Clone)]
pub struct PgNotificationLog {
    db: PgPool,
}

impl PgNotificationLog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationLog for PgNotificationLog {
    async fn append(&self, notification: NewNotification) -> AppResult<NotificationRecord> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notification_log (
                id, farmer_id, farmer_name, farmer_phone,
                message, message_type, status, provider_ref
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, farmer_id, farmer_name, farmer_phone, message,
                      message_type, status, provider_ref, sent_at, delivery_time
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.farmer_id)
        .bind(&notification.farmer_name)
        .bind(&notification.farmer_phone)
        .bind(&notification.message)
        .bind(notification.message_type.as_str())
        .bind(notification.status.as_str())
        .bind(&notification.provider_ref)
        .fetch_one(&self.db)
        .await?;

        NotificationRecord::try_from(row)
    }

    async fn summarize(&self, since: DateTime<Utc>) -> AppResult<LogSummary> {
        let (total, since_count) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE sent_at >= $1)
            FROM notification_log
            "#,
        )
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        let status_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM notification_log GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.db)
        .await?;

        let category_rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT message_type, COUNT(*) FROM notification_log
            GROUP BY message_type ORDER BY message_type
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let by_status = status_rows
            .into_iter()
            .map(|(status, n)| Ok((parse_column::<DeliveryStatus>("status", &status)?, n)))
            .collect::<AppResult<Vec<_>>>()?;

        let by_category = category_rows
            .into_iter()
            .map(|(category, count)| {
                Ok(CategoryCount {
                    message_type: parse_column("message_type", &category)?,
                    count,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(LogSummary {
            total,
            by_status,
            by_category,
            since_count,
        })
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<NotificationRecord>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, farmer_id, farmer_name, farmer_phone, message,
                   message_type, status, provider_ref, sent_at, delivery_time
            FROM notification_log
            ORDER BY sent_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(NotificationRecord::try_from).collect()
    }
}

// ============================================================================
// Alert sessions
// ============================================================================

#[derive(Clone)]
pub struct PgAlertSessions {
    db: PgPool,
}

impl PgAlertSessions {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AlertSessionStore for PgAlertSessions {
    async fn claim(&self, fingerprint: &str, subject_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO alert_sessions (fingerprint, farmer_id, session_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (fingerprint, session_date) DO NOTHING
            "#,
        )
        .bind(fingerprint)
        .bind(subject_id)
        .bind(day)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, fingerprint: &str, day: NaiveDate) -> AppResult<()> {
        sqlx::query("DELETE FROM alert_sessions WHERE fingerprint = $1 AND session_date = $2")
            .bind(fingerprint)
            .bind(day)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
