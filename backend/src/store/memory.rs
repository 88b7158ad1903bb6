//! In-memory collaborators for demo mode and tests

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use shared::models::{
    CategoryCount, LogSummary, NewNotification, NotificationRecord, Subject, SubjectCensus,
};
use shared::{DeliveryStatus, MessageCategory};

use super::{in_input_order, AlertSessionStore, NotificationLog, SubjectStore};
use crate::error::{AppError, AppResult};

const STATUS_ORDER: [DeliveryStatus; 5] = [
    DeliveryStatus::Sent,
    DeliveryStatus::Delivered,
    DeliveryStatus::Failed,
    DeliveryStatus::NotConfigured,
    DeliveryStatus::Logged,
];

const CATEGORY_ORDER: [MessageCategory; 4] = [
    MessageCategory::WeatherAlert,
    MessageCategory::MarketUpdate,
    MessageCategory::CropAdvice,
    MessageCategory::General,
];

// ============================================================================
// Subjects
// ============================================================================

#[derive(Default)]
pub struct MemorySubjectStore {
    subjects: RwLock<Vec<Subject>>,
}

impl MemorySubjectStore {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self {
            subjects: RwLock::new(subjects),
        }
    }

    /// Load subjects from a JSON array
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let subjects: Vec<Subject> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Configuration(format!("invalid seed file: {}", e)))?;
        Ok(Self::new(subjects))
    }

}

#[async_trait]
impl SubjectStore for MemorySubjectStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Subject>> {
        Ok(self.subjects.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Subject>> {
        let mut active: Vec<Subject> = self
            .subjects
            .read()
            .await
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|s| s.created_at);
        Ok(active)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let matches = self
            .subjects
            .read()
            .await
            .iter()
            .filter(|s| wanted.contains(&s.id))
            .cloned()
            .collect();
        Ok(in_input_order(ids, matches))
    }

    async fn find_by_location(&self, pincode: &str, crop: Option<&str>) -> AppResult<Vec<Subject>> {
        let mut matches: Vec<Subject> = self
            .subjects
            .read()
            .await
            .iter()
            .filter(|s| s.is_active && s.pincode == pincode)
            .filter(|s| crop.map_or(true, |c| s.crop_name.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();
        matches.sort_by_key(|s| s.created_at);
        Ok(matches)
    }

    async fn census(&self, limit: i64) -> AppResult<SubjectCensus> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(SubjectCensus::tally(&self.subjects.read().await, limit))
    }
}

// ============================================================================
// Notification log
// ============================================================================

#[derive(Default)]
pub struct MemoryNotificationLog {
    records: Mutex<Vec<NotificationRecord>>,
}

impl MemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record in append order
    pub async fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().await.clone()
    }

    /// Insert a fully formed record, e.g. one with a backdated `sent_at`
    pub async fn push(&self, record: NotificationRecord) {
        self.records.lock().await.push(record);
    }
}

#[async_trait]
impl NotificationLog for MemoryNotificationLog {
    async fn append(&self, notification: NewNotification) -> AppResult<NotificationRecord> {
        let record = NotificationRecord {
            id: Uuid::new_v4(),
            farmer_id: notification.farmer_id,
            farmer_name: notification.farmer_name,
            farmer_phone: notification.farmer_phone,
            message: notification.message,
            message_type: notification.message_type,
            status: notification.status,
            provider_ref: notification.provider_ref,
            sent_at: Utc::now(),
            delivery_time: None,
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn summarize(&self, since: DateTime<Utc>) -> AppResult<LogSummary> {
        let records = self.records.lock().await;

        let by_status = STATUS_ORDER
            .iter()
            .map(|status| (*status, records.iter().filter(|r| r.status == *status).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect();

        let by_category = CATEGORY_ORDER
            .iter()
            .map(|category| CategoryCount {
                message_type: *category,
                count: records.iter().filter(|r| r.message_type == *category).count() as i64,
            })
            .filter(|c| c.count > 0)
            .collect();

        Ok(LogSummary {
            total: records.len() as i64,
            by_status,
            by_category,
            since_count: records.iter().filter(|r| r.sent_at >= since).count() as i64,
        })
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<NotificationRecord>> {
        let mut records = self.records.lock().await.clone();
        // Stable sort keeps later appends first among equal timestamps
        records.reverse();
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}

// ============================================================================
// Alert sessions
// ============================================================================

#[derive(Default)]
pub struct MemoryAlertSessions {
    claimed: Mutex<HashSet<(String, NaiveDate)>>,
}

impl MemoryAlertSessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertSessionStore for MemoryAlertSessions {
    async fn claim(&self, fingerprint: &str, _subject_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        Ok(self.claimed.lock().await.insert((fingerprint.to_string(), day)))
    }

    async fn release(&self, fingerprint: &str, day: NaiveDate) -> AppResult<()> {
        self.claimed.lock().await.remove(&(fingerprint.to_string(), day));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::{SoilHealth, SoilType};

    fn subject(name: &str, pincode: &str, crop: &str, active: bool) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mobile_number: "9876543210".to_string(),
            pincode: pincode.to_string(),
            crop_name: crop.to_string(),
            soil_type: SoilType::Loamy,
            soil_health: SoilHealth::Good,
            seed_sowing_date: Utc::now().date_naive(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn notification(category: MessageCategory, status: DeliveryStatus) -> NewNotification {
        NewNotification {
            farmer_id: Uuid::new_v4(),
            farmer_name: "Asha".to_string(),
            farmer_phone: "9876543210".to_string(),
            message: "Rain expected".to_string(),
            message_type: category,
            status,
            provider_ref: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_keeps_input_order() {
        let a = subject("A", "110001", "Rice", true);
        let b = subject("B", "110001", "Wheat", true);
        let c = subject("C", "400001", "Cotton", false);
        let ids = vec![c.id, Uuid::new_v4(), a.id, b.id];
        let store = MemorySubjectStore::new(vec![a.clone(), b.clone(), c.clone()]);

        let found: Vec<String> = store
            .find_by_ids(&ids)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();

        assert_eq!(found, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_find_by_location_filters_crop_and_activity() {
        let store = MemorySubjectStore::new(vec![
            subject("A", "110001", "Rice", true),
            subject("B", "110001", "Wheat", true),
            subject("C", "110001", "rice", false),
            subject("D", "400001", "Rice", true),
        ]);

        assert_eq!(store.find_by_location("110001", None).await.unwrap().len(), 2);
        let rice = store.find_by_location("110001", Some("RICE")).await.unwrap();
        assert_eq!(rice.len(), 1);
        assert_eq!(rice[0].name, "A");
    }

    #[tokio::test]
    async fn test_census_counts_inactive_registrations() {
        let store = MemorySubjectStore::new(vec![
            subject("A", "110001", "Rice", true),
            subject("B", "110001", "Rice", false),
            subject("C", "400001", "Cotton", true),
        ]);

        let census = store.census(1).await.unwrap();

        assert_eq!(census.total, 3);
        assert_eq!(census.active, 2);
        assert_eq!(census.recent_registrations.len(), 1);
        assert_eq!(census.top_crops.len(), 1);
        assert_eq!(census.top_crops[0].name, "Rice");
        assert_eq!(census.top_crops[0].count, 2);
        assert_eq!(census.top_pincodes[0].name, "110001");
    }

    #[tokio::test]
    async fn test_summary_counts_and_window() {
        let log = MemoryNotificationLog::new();
        log.append(notification(MessageCategory::CropAdvice, DeliveryStatus::Logged))
            .await
            .unwrap();
        log.append(notification(MessageCategory::CropAdvice, DeliveryStatus::Failed))
            .await
            .unwrap();
        let mut old = log
            .append(notification(MessageCategory::General, DeliveryStatus::Sent))
            .await
            .unwrap();
        old.id = Uuid::new_v4();
        old.sent_at = Utc::now() - Duration::days(10);
        log.push(old).await;

        let summary = log.summarize(Utc::now() - Duration::days(7)).await.unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.since_count, 3);
        assert_eq!(
            summary.by_status,
            vec![
                (DeliveryStatus::Sent, 2),
                (DeliveryStatus::Failed, 1),
                (DeliveryStatus::Logged, 1),
            ]
        );
        assert_eq!(summary.by_category[0].message_type, MessageCategory::CropAdvice);
        assert_eq!(summary.by_category[0].count, 2);
    }

    #[tokio::test]
    async fn test_recent_newest_first_and_limited() {
        let log = MemoryNotificationLog::new();
        for _ in 0..5 {
            log.append(notification(MessageCategory::General, DeliveryStatus::Logged))
                .await
                .unwrap();
        }
        let all = log.records().await;

        let recent = log.recent(3).await.unwrap();

        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, all[4].id);
        assert!(log.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_alert_session_claimed_once_per_day() {
        let sessions = MemoryAlertSessions::new();
        let subject_id = Uuid::new_v4();
        let today = Utc::now().date_naive();

        assert!(sessions.claim("abc", subject_id, today).await.unwrap());
        assert!(!sessions.claim("abc", subject_id, today).await.unwrap());
        assert!(sessions
            .claim("abc", subject_id, today + Duration::days(1))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_released_session_can_be_claimed_again() {
        let sessions = MemoryAlertSessions::new();
        let subject_id = Uuid::new_v4();
        let today = Utc::now().date_naive();

        assert!(sessions.claim("abc", subject_id, today).await.unwrap());
        sessions.release("abc", today).await.unwrap();

        assert!(sessions.claim("abc", subject_id, today).await.unwrap());
    }

    #[tokio::test]
    async fn test_summary_window_includes_boundary() {
        let log = MemoryNotificationLog::new();
        let since = Utc::now() - Duration::days(7);
        let mut at_boundary = log
            .append(notification(MessageCategory::General, DeliveryStatus::Logged))
            .await
            .unwrap();
        at_boundary.sent_at = since;
        let mut just_before = at_boundary.clone();
        just_before.id = Uuid::new_v4();
        just_before.sent_at = since - Duration::seconds(1);

        let log = MemoryNotificationLog::new();
        log.push(at_boundary).await;
        log.push(just_before).await;

        let summary = log.summarize(since).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.since_count, 1);
    }
}
