//! Weather data models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of days carried in every forecast
pub const FORECAST_DAYS: usize = 5;

/// Current conditions plus a short-range forecast for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub location: String,
    pub current: CurrentConditions,
    /// Chronologically ascending, `FORECAST_DAYS` entries
    pub forecast: Vec<DailyForecast>,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    /// km/h
    pub wind_speed_kmh: Decimal,
    pub pressure_hpa: i32,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Daily weather forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub description: String,
}

impl WeatherSnapshot {
    /// Check the forecast shape: exactly `FORECAST_DAYS` entries with strictly
    /// ascending dates.
    pub fn has_valid_forecast(&self) -> bool {
        self.forecast.len() == FORECAST_DAYS
            && self.forecast.windows(2).all(|w| w[0].date < w[1].date)
    }
}
