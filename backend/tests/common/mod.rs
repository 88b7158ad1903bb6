//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use farmhub_backend::external::{
    FixtureWeatherSource, LogOnlyChannel, MarketDataset, MarketSource, StaticMarketSource,
    WeatherSource,
};
use farmhub_backend::services::Stores;
use farmhub_backend::store::{
    MemoryAlertSessions, MemoryNotificationLog, MemorySubjectStore, NotificationLog,
};
use farmhub_backend::{AppError, AppResult, AppState, Config};
use shared::models::{
    LogSummary, MarketSnapshot, MspRecord, NewNotification, NotificationRecord, Subject, TopCrop,
};
use shared::{SoilHealth, SoilType, Trend};

pub fn subject(name: &str, pincode: &str, crop: &str, soil_health: SoilHealth) -> Subject {
    Subject {
        id: Uuid::new_v4(),
        name: name.to_string(),
        mobile_number: "9876543210".to_string(),
        pincode: pincode.to_string(),
        crop_name: crop.to_string(),
        soil_type: SoilType::Loamy,
        soil_health,
        seed_sowing_date: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Built-in dataset with one extra price table
pub fn dataset_with(location: &str, crops: &[(&str, i64)]) -> MarketDataset {
    let mut dataset = MarketDataset::builtin();
    dataset.locations.insert(
        location.to_string(),
        crops
            .iter()
            .map(|(name, price)| TopCrop {
                name: name.to_string(),
                current_price: Decimal::from(*price),
                trend: Trend::Stable,
            })
            .collect(),
    );
    dataset
}

/// Notification log whose appends fail for chosen subjects
#[derive(Default)]
pub struct FlakyLog {
    pub inner: MemoryNotificationLog,
    fail_for: HashSet<Uuid>,
}

impl FlakyLog {
    pub fn failing_for(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            inner: MemoryNotificationLog::new(),
            fail_for: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl NotificationLog for FlakyLog {
    async fn append(&self, notification: NewNotification) -> AppResult<NotificationRecord> {
        if self.fail_for.contains(&notification.farmer_id) {
            return Err(AppError::Persistence("disk full".to_string()));
        }
        self.inner.append(notification).await
    }

    async fn summarize(&self, since: DateTime<Utc>) -> AppResult<LogSummary> {
        self.inner.summarize(since).await
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<NotificationRecord>> {
        self.inner.recent(limit).await
    }
}

/// Market source that is always down
pub struct DownMarket;

#[async_trait]
impl MarketSource for DownMarket {
    async fn get_market(&self, _location: &str, _crop: &str) -> AppResult<Option<MarketSnapshot>> {
        Err(AppError::DataUnavailable("market feed down".to_string()))
    }

    async fn get_msp(&self, _crop: &str) -> AppResult<Option<MspRecord>> {
        Err(AppError::DataUnavailable("market feed down".to_string()))
    }

    async fn get_top_crops(&self, _location: &str) -> AppResult<Vec<TopCrop>> {
        Err(AppError::DataUnavailable("market feed down".to_string()))
    }
}

/// Engine wired over in-memory collaborators
pub struct Harness {
    pub state: AppState,
    pub subjects: Arc<MemorySubjectStore>,
    pub log: Arc<dyn NotificationLog>,
    pub shutdown: CancellationToken,
}

pub struct HarnessBuilder {
    subjects: Vec<Subject>,
    weather: Arc<dyn WeatherSource>,
    market: Arc<dyn MarketSource>,
    log: Option<Arc<dyn NotificationLog>>,
    config: Config,
}

impl HarnessBuilder {
    pub fn new(weather: FixtureWeatherSource) -> Self {
        Self {
            subjects: Vec::new(),
            weather: Arc::new(weather),
            market: Arc::new(StaticMarketSource::new(MarketDataset::builtin())),
            log: None,
            config: Config::default(),
        }
    }

    pub fn subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn market(mut self, market: impl MarketSource + 'static) -> Self {
        self.market = Arc::new(market);
        self
    }

    pub fn log(mut self, log: Arc<dyn NotificationLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn config(mut self, update: impl FnOnce(&mut Config)) -> Self {
        update(&mut self.config);
        self
    }

    pub fn build(self) -> Harness {
        let subjects = Arc::new(MemorySubjectStore::new(self.subjects));
        let log = self
            .log
            .unwrap_or_else(|| Arc::new(MemoryNotificationLog::new()));
        let shutdown = CancellationToken::new();

        let state = AppState::new(
            self.config,
            Stores {
                subjects: subjects.clone(),
                notifications: log.clone(),
                sessions: Arc::new(MemoryAlertSessions::new()),
            },
            self.weather,
            self.market,
            Arc::new(LogOnlyChannel),
            shutdown.clone(),
        );

        Harness {
            state,
            subjects,
            log,
            shutdown,
        }
    }
}

/// A record sent `days_ago` days before now
pub fn record_sent(days_ago: i64, status: shared::DeliveryStatus) -> NotificationRecord {
    NotificationRecord {
        id: Uuid::new_v4(),
        farmer_id: Uuid::new_v4(),
        farmer_name: "Asha".to_string(),
        farmer_phone: "9876543210".to_string(),
        message: "Daily Farming Tip".to_string(),
        message_type: shared::MessageCategory::CropAdvice,
        status,
        provider_ref: None,
        sent_at: Utc::now() - Duration::days(days_ago),
        delivery_time: None,
    }
}
