//! Agronomic recommendations and daily farming tips

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{CropInsights, CurrentConditions, MarketSnapshot, MspRecord, Subject};
use crate::rules::{high_price_factor, HIGH_TEMPERATURE_C, LOW_HUMIDITY_PERCENT};
use crate::types::SoilHealth;

pub const IRRIGATION_FREQUENCY: &str = "Increase irrigation frequency due to high temperature";
pub const SUPPLEMENTAL_IRRIGATION: &str = "Consider additional irrigation for low humidity";
pub const GOVERNMENT_PROCUREMENT: &str =
    "Current price below MSP - consider government procurement";
pub const GOOD_TIME_TO_SELL: &str = "Good time to sell - price significantly above MSP";
pub const SOIL_IMPROVEMENT: &str = "Consider soil improvement measures and organic fertilizers";

/// Days from sowing to harvest assumed for every crop
pub const GROWING_SEASON_DAYS: i64 = 120;

/// Build the ordered recommendation list. Rules are applied in a fixed order
/// and are not deduplicated; missing market data skips the price rules.
pub fn generate(
    current: &CurrentConditions,
    market: Option<&MarketSnapshot>,
    msp: Option<&MspRecord>,
    soil_health: SoilHealth,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if current.temperature_celsius > Decimal::from(HIGH_TEMPERATURE_C) {
        recommendations.push(IRRIGATION_FREQUENCY.to_string());
    }
    if current.humidity_percent < LOW_HUMIDITY_PERCENT {
        recommendations.push(SUPPLEMENTAL_IRRIGATION.to_string());
    }

    if let (Some(market), Some(msp)) = (market, msp) {
        if market.current_price < msp.msp {
            recommendations.push(GOVERNMENT_PROCUREMENT.to_string());
        } else if market.current_price > msp.msp * high_price_factor() {
            recommendations.push(GOOD_TIME_TO_SELL.to_string());
        }
    }

    if soil_health == SoilHealth::Poor {
        recommendations.push(SOIL_IMPROVEMENT.to_string());
    }

    recommendations
}

/// Pick the daily tip for a crop and soil grade, ready to dispatch
pub fn daily_tip(crop_name: &str, soil_health: SoilHealth) -> String {
    let crop = crop_name.to_lowercase();
    let mut tip = if crop.contains("rice") {
        "Rice farming tip: Maintain 2-3 inches of water level during vegetative growth."
    } else if crop.contains("wheat") {
        "Wheat farming tip: Ensure proper irrigation at crown root initiation stage."
    } else if crop.contains("cotton") {
        "Cotton farming tip: Monitor for bollworm infestation and apply timely pesticides."
    } else {
        "General tip: Regular soil testing helps optimize fertilizer application."
    }
    .to_string();

    if soil_health == SoilHealth::Poor {
        tip.push_str(" Consider organic matter addition to improve soil health.");
    }

    format!("Daily Farming Tip: {} - FarmHub", tip)
}

/// Harvest estimate and simplified vegetation index for a subject
pub fn crop_insights(current: &CurrentConditions, subject: &Subject) -> CropInsights {
    CropInsights {
        seed_sowing_date: subject.seed_sowing_date,
        estimated_harvest_date: estimated_harvest_date(subject.seed_sowing_date),
        ndvi_index: ndvi_index(current, subject.soil_health),
    }
}

pub fn estimated_harvest_date(sowing: NaiveDate) -> NaiveDate {
    sowing + Duration::days(GROWING_SEASON_DAYS)
}

/// NDVI approximation from temperature, humidity and soil grade, in [0, 1]
pub fn ndvi_index(current: &CurrentConditions, soil_health: SoilHealth) -> Decimal {
    let mut ndvi = Decimal::new(5, 1);
    let temperature = current.temperature_celsius;

    if temperature >= Decimal::from(20) && temperature <= Decimal::from(30) {
        ndvi += Decimal::new(2, 1);
    }
    if (40..=70).contains(&current.humidity_percent) {
        ndvi += Decimal::new(15, 2);
    }
    ndvi += match soil_health {
        SoilHealth::Excellent => Decimal::new(15, 2),
        SoilHealth::Good => Decimal::new(1, 1),
        SoilHealth::Fair | SoilHealth::Poor => Decimal::ZERO,
    };

    ndvi.clamp(Decimal::ZERO, Decimal::ONE)
}
