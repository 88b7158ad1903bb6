//! Market price models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Trend;

/// Current market price for a crop at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub crop_name: String,
    /// Currency units per quintal
    pub current_price: Decimal,
    pub trend: Trend,
    pub last_updated: DateTime<Utc>,
}

/// Minimum Support Price for a crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MspRecord {
    pub crop_name: String,
    pub msp: Decimal,
    pub unit: String,
}

/// One entry of a location's top-crop ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCrop {
    pub name: String,
    pub current_price: Decimal,
    pub trend: Trend,
}

/// Market view for a farmer's own crop plus what sells nearby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectMarketView {
    pub current_crop: CropPrice,
    pub top_crops_in_area: Vec<TopCrop>,
}

/// Price summary with absent data shown as zero / stable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropPrice {
    pub name: String,
    pub current_price: Decimal,
    pub msp: Decimal,
    pub trend: Trend,
}

impl CropPrice {
    pub fn new(name: &str, market: Option<&MarketSnapshot>, msp: Option<&MspRecord>) -> Self {
        Self {
            name: name.to_string(),
            current_price: market.map(|m| m.current_price).unwrap_or(Decimal::ZERO),
            msp: msp.map(|m| m.msp).unwrap_or(Decimal::ZERO),
            trend: market.map(|m| m.trend).unwrap_or_default(),
        }
    }
}
