//! Evaluation results returned to callers

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Alert, CropPrice, DispatchOutcome, SubjectSummary, WeatherSnapshot};

/// Everything computed for one farmer's dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectOverview {
    pub farmer: SubjectSummary,
    pub weather: WeatherSnapshot,
    pub weather_alerts: Vec<Alert>,
    pub market: CropPrice,
    pub market_alerts: Vec<Alert>,
    /// Weather and market alerts, severity ordered
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<String>,
    pub farming: CropInsights,
    pub notification: AlertNotification,
}

/// What happened to the consolidated warning notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AlertNotification {
    /// No warning-severity alert was produced
    NotRequired,
    /// Same warning set was already dispatched today
    AlreadySent { fingerprint: String },
    Dispatched { outcome: DispatchOutcome },
}

/// Crop progress estimates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropInsights {
    pub seed_sowing_date: NaiveDate,
    pub estimated_harvest_date: NaiveDate,
    pub ndvi_index: Decimal,
}

/// Weather for a location with the alerts it triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationWeather {
    pub weather: WeatherSnapshot,
    pub alerts: Vec<Alert>,
    pub timestamp: DateTime<Utc>,
}

/// Severity-ordered alert list from a fleet scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetAlerts {
    pub alerts: Vec<Alert>,
    pub total_alerts: usize,
    /// Locations whose data could not be fetched
    pub skipped_locations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
