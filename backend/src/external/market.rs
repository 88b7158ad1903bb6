//! Market price and MSP sources
//!
//! Prices come from an injected read-only dataset: the built-in tables, or a
//! JSON file supplied through configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{MarketSnapshot, MspRecord, TopCrop};
use shared::Trend;

use crate::error::{AppError, AppResult};

const MSP_UNIT: &str = "per quintal";

/// Supplies market prices, MSP records and top crops
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Current price of a crop at a location; `None` when not traded there
    async fn get_market(&self, location: &str, crop: &str) -> AppResult<Option<MarketSnapshot>>;

    /// Statutory floor price for a crop; `None` when no MSP is defined
    async fn get_msp(&self, crop: &str) -> AppResult<Option<MspRecord>>;

    /// Top crops at a location, in source order
    async fn get_top_crops(&self, location: &str) -> AppResult<Vec<TopCrop>>;
}

/// Read-only price tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketDataset {
    pub msp: Vec<MspRecord>,
    /// Crops traded per location, in ranking order
    pub locations: BTreeMap<String, Vec<TopCrop>>,
    /// Returned for locations without a table
    #[serde(default = "default_top_crops")]
    pub default_top_crops: Vec<TopCrop>,
}

fn crop(name: &str, price: i64, trend: Trend) -> TopCrop {
    TopCrop {
        name: name.to_string(),
        current_price: Decimal::from(price),
        trend,
    }
}

fn default_top_crops() -> Vec<TopCrop> {
    vec![
        crop("Rice", 2200, Trend::Stable),
        crop("Wheat", 2300, Trend::Stable),
        crop("Maize", 1900, Trend::Stable),
    ]
}

impl MarketDataset {
    /// Built-in MSP table plus prices for New Delhi, Mumbai and Kolkata
    pub fn builtin() -> Self {
        let msp = [
            ("Rice", 2040),
            ("Wheat", 2125),
            ("Maize", 1870),
            ("Cotton", 6620),
            ("Sugarcane", 315),
            ("Pulses", 6400),
            ("Oilseeds", 5450),
        ]
        .into_iter()
        .map(|(name, amount)| MspRecord {
            crop_name: name.to_string(),
            msp: Decimal::from(amount),
            unit: MSP_UNIT.to_string(),
        })
        .collect();

        let mut locations = BTreeMap::new();
        locations.insert(
            "110001".to_string(),
            vec![
                crop("Rice", 2200, Trend::Up),
                crop("Wheat", 2300, Trend::Down),
                crop("Maize", 1900, Trend::Stable),
            ],
        );
        locations.insert(
            "400001".to_string(),
            vec![
                crop("Rice", 2350, Trend::Up),
                crop("Wheat", 2250, Trend::Up),
                crop("Cotton", 6800, Trend::Down),
            ],
        );
        locations.insert(
            "700001".to_string(),
            vec![
                crop("Rice", 2100, Trend::Stable),
                crop("Pulses", 6500, Trend::Up),
                crop("Oilseeds", 5600, Trend::Up),
            ],
        );

        Self {
            msp,
            locations,
            default_top_crops: default_top_crops(),
        }
    }

    /// Load a dataset from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("cannot read market dataset {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("invalid market dataset: {}", e)))
    }

    fn msp_for(&self, crop_name: &str) -> Option<&MspRecord> {
        self.msp
            .iter()
            .find(|record| record.crop_name.eq_ignore_ascii_case(crop_name))
    }

    fn price_for(&self, location: &str, crop_name: &str) -> Option<&TopCrop> {
        self.locations
            .get(location)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(crop_name))
    }

    fn top_crops_for(&self, location: &str) -> &[TopCrop] {
        self.locations
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_top_crops)
    }
}

impl Default for MarketDataset {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Market source backed by a `MarketDataset`
#[derive(Clone)]
pub struct StaticMarketSource {
    dataset: Arc<MarketDataset>,
}

impl StaticMarketSource {
    pub fn new(dataset: MarketDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }
}

#[async_trait]
impl MarketSource for StaticMarketSource {
    async fn get_market(&self, location: &str, crop: &str) -> AppResult<Option<MarketSnapshot>> {
        Ok(self.dataset.price_for(location, crop).map(|entry| MarketSnapshot {
            crop_name: entry.name.clone(),
            current_price: entry.current_price,
            trend: entry.trend,
            last_updated: Utc::now(),
        }))
    }

    async fn get_msp(&self, crop: &str) -> AppResult<Option<MspRecord>> {
        Ok(self.dataset.msp_for(crop).cloned())
    }

    async fn get_top_crops(&self, location: &str) -> AppResult<Vec<TopCrop>> {
        Ok(self.dataset.top_crops_for(location).to_vec())
    }
}
