//! Notification log models and statistics

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DeliveryStatus, MessageCategory};

/// Immutable record of one dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub farmer_phone: String,
    pub message: String,
    pub message_type: MessageCategory,
    pub status: DeliveryStatus,
    /// Reference assigned by the delivery provider
    pub provider_ref: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
}

/// Fields supplied when appending to the notification log
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub farmer_phone: String,
    pub message: String,
    pub message_type: MessageCategory,
    pub status: DeliveryStatus,
    pub provider_ref: Option<String>,
}

/// Result of one dispatch attempt as seen by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn delivered(reference: Option<String>) -> Self {
        Self {
            success: true,
            reference,
            error: None,
        }
    }

    pub fn failed(reference: Option<String>, error: String) -> Self {
        Self {
            success: false,
            reference,
            error: Some(error),
        }
    }
}

/// Record count for one message category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub message_type: MessageCategory,
    pub count: i64,
}

/// Raw counts produced by a notification log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSummary {
    pub total: i64,
    pub by_status: Vec<(DeliveryStatus, i64)>,
    pub by_category: Vec<CategoryCount>,
    /// Records with `sent_at >= since`
    pub since_count: i64,
}

/// Aggregate view of the notification log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationStatistics {
    pub total: i64,
    pub successful: i64,
    pub failed: i64,
    /// Percentage with two decimals; zero when nothing was dispatched
    pub success_rate: Decimal,
    pub by_category: Vec<CategoryCount>,
    pub last_7_days: i64,
    pub recent: Vec<NotificationRecord>,
}

impl NotificationStatistics {
    pub fn from_summary(summary: LogSummary, recent: Vec<NotificationRecord>) -> Self {
        let count = |accept: fn(&DeliveryStatus) -> bool| -> i64 {
            summary
                .by_status
                .iter()
                .filter(|(status, _)| accept(status))
                .map(|(_, n)| n)
                .sum()
        };
        let successful = count(DeliveryStatus::is_success);
        let failed = count(|s| !s.is_success());

        Self {
            total: summary.total,
            successful,
            failed,
            success_rate: percentage(successful, summary.total),
            by_category: summary.by_category,
            last_7_days: summary.since_count,
            recent,
        }
    }
}

/// `part / whole * 100` rounded half away from zero to two decimals
pub fn percentage(part: i64, whole: i64) -> Decimal {
    if whole <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
