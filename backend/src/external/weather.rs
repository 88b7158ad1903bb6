//! Weather sources for current conditions and short-range forecasts
//!
//! Two implementations share the `WeatherSource` seam: a randomized generator
//! for demos and a fixture table for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use shared::models::{CurrentConditions, DailyForecast, WeatherSnapshot, FORECAST_DAYS};

use crate::error::{AppError, AppResult};

/// Descriptions carried by forecast days +1..+5
const FORECAST_DESCRIPTIONS: [&str; FORECAST_DAYS] =
    ["Sunny", "Cloudy", "Light rain", "Partly cloudy", "Sunny"];

const CURRENT_DESCRIPTION: &str = "Partly cloudy";

/// Supplies a weather snapshot for a location key (pincode)
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fails with `AppError::DataUnavailable` when no snapshot can be produced
    async fn get_weather(&self, location: &str) -> AppResult<WeatherSnapshot>;
}

fn location_label(location: &str) -> String {
    format!("Area {}", location)
}

fn forecast_dates(today: NaiveDate) -> impl Iterator<Item = (NaiveDate, &'static str)> {
    FORECAST_DESCRIPTIONS
        .iter()
        .enumerate()
        .map(move |(i, description)| (today + ChronoDuration::days(i as i64 + 1), *description))
}

// ============================================================================
// Randomized generator
// ============================================================================

/// Generates plausible weather on every call; never repeats a snapshot
pub struct RandomWeatherSource {
    rng: Mutex<StdRng>,
}

impl RandomWeatherSource {
    /// Create a generator, reproducible when a seed is given
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Mutex::new(rng) }
    }

    fn generate(&self, location: &str) -> WeatherSnapshot {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();

        let current = CurrentConditions {
            temperature_celsius: Decimal::from(rng.gen_range(20..40)),
            humidity_percent: rng.gen_range(40..70),
            wind_speed_kmh: Decimal::from(rng.gen_range(5..20)),
            pressure_hpa: rng.gen_range(1000..1050),
            description: CURRENT_DESCRIPTION.to_string(),
            timestamp: now,
        };

        let forecast = forecast_dates(now.date_naive())
            .map(|(date, description)| DailyForecast {
                date,
                temperature_celsius: Decimal::from(rng.gen_range(20..40)),
                humidity_percent: rng.gen_range(40..70),
                description: description.to_string(),
            })
            .collect();

        WeatherSnapshot {
            location: location_label(location),
            current,
            forecast,
        }
    }
}

#[async_trait]
impl WeatherSource for RandomWeatherSource {
    async fn get_weather(&self, location: &str) -> AppResult<WeatherSnapshot> {
        if location.trim().is_empty() {
            return Err(AppError::DataUnavailable("empty location key".to_string()));
        }
        Ok(self.generate(location))
    }
}

// ============================================================================
// Fixture table
// ============================================================================

/// Fixed conditions for one location
#[derive(Debug, Clone)]
pub struct FixtureConditions {
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_kmh: Decimal,
}

impl FixtureConditions {
    pub fn new(temperature: i64, humidity: i32, wind: i64) -> Self {
        Self {
            temperature_celsius: Decimal::from(temperature),
            humidity_percent: humidity,
            wind_speed_kmh: Decimal::from(wind),
        }
    }
}

/// Deterministic source; unknown locations are unavailable
#[derive(Default)]
pub struct FixtureWeatherSource {
    conditions: HashMap<String, FixtureConditions>,
    delay: Option<Duration>,
}

impl FixtureWeatherSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: &str, conditions: FixtureConditions) -> Self {
        self.conditions.insert(location.to_string(), conditions);
        self
    }

    /// Delay every lookup, to exercise caller timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl WeatherSource for FixtureWeatherSource {
    async fn get_weather(&self, location: &str) -> AppResult<WeatherSnapshot> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let fixed = self
            .conditions
            .get(location)
            .ok_or_else(|| AppError::DataUnavailable(format!("no weather for {}", location)))?;

        let now = Utc::now();
        let forecast = forecast_dates(now.date_naive())
            .map(|(date, description)| DailyForecast {
                date,
                temperature_celsius: fixed.temperature_celsius,
                humidity_percent: fixed.humidity_percent,
                description: description.to_string(),
            })
            .collect();

        Ok(WeatherSnapshot {
            location: location_label(location),
            current: CurrentConditions {
                temperature_celsius: fixed.temperature_celsius,
                humidity_percent: fixed.humidity_percent,
                wind_speed_kmh: fixed.wind_speed_kmh,
                pressure_hpa: 1012,
                description: CURRENT_DESCRIPTION.to_string(),
                timestamp: now,
            },
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_snapshot_within_ranges() {
        let source = RandomWeatherSource::new(Some(42));

        for _ in 0..50 {
            let snapshot = source.get_weather("110001").await.unwrap();
            let current = &snapshot.current;

            assert!(current.temperature_celsius >= Decimal::from(20));
            assert!(current.temperature_celsius < Decimal::from(40));
            assert!((40..70).contains(&current.humidity_percent));
            assert!(current.wind_speed_kmh >= Decimal::from(5));
            assert!(current.wind_speed_kmh < Decimal::from(20));
            assert!((1000..1050).contains(&current.pressure_hpa));
            assert!(snapshot.has_valid_forecast());
            assert_eq!(snapshot.location, "Area 110001");
        }
    }

    #[tokio::test]
    async fn test_seeded_sources_agree() {
        let a = RandomWeatherSource::new(Some(7));
        let b = RandomWeatherSource::new(Some(7));

        let first = a.get_weather("400001").await.unwrap();
        let second = b.get_weather("400001").await.unwrap();

        assert_eq!(first.current.temperature_celsius, second.current.temperature_celsius);
        assert_eq!(first.current.humidity_percent, second.current.humidity_percent);
    }

    #[tokio::test]
    async fn test_forecast_descriptions_in_order() {
        let source = RandomWeatherSource::new(Some(1));
        let snapshot = source.get_weather("700001").await.unwrap();
        let descriptions: Vec<&str> =
            snapshot.forecast.iter().map(|f| f.description.as_str()).collect();

        assert_eq!(descriptions, FORECAST_DESCRIPTIONS.to_vec());
        assert_eq!(
            snapshot.forecast[0].date,
            snapshot.current.timestamp.date_naive() + ChronoDuration::days(1)
        );
    }

    #[tokio::test]
    async fn test_fixture_unknown_location_unavailable() {
        let source = FixtureWeatherSource::new()
            .with_location("110001", FixtureConditions::new(38, 25, 10));

        let known = source.get_weather("110001").await.unwrap();
        assert_eq!(known.current.temperature_celsius, Decimal::from(38));

        let err = source.get_weather("999999").await.unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }
}
