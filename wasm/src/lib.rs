//! WebAssembly module for FarmHub
//!
//! Exposes the alert rules, recommendations and daily tips to the browser so
//! the dashboard can preview alerts offline. Inputs and outputs are JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use shared::models::{CurrentConditions, MarketSnapshot, MspRecord};
use shared::{recommendations, rules, SoilHealth, Trend};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Current conditions as sent by the dashboard
#[derive(Debug, Deserialize)]
struct ConditionsInput {
    temperature_celsius: Decimal,
    humidity_percent: i32,
    #[serde(default)]
    wind_speed_kmh: Decimal,
}

impl ConditionsInput {
    // The rules only read the measurements; the browser has no reliable clock
    fn into_conditions(self) -> CurrentConditions {
        CurrentConditions {
            temperature_celsius: self.temperature_celsius,
            humidity_percent: self.humidity_percent,
            wind_speed_kmh: self.wind_speed_kmh,
            pressure_hpa: 0,
            description: String::new(),
            timestamp: DateTime::<Utc>::default(),
        }
    }
}

/// Crop price against its MSP; either side may be unknown
#[derive(Debug, Default, Deserialize)]
struct PriceInput {
    #[serde(default)]
    crop_name: String,
    current_price: Option<Decimal>,
    msp: Option<Decimal>,
}

impl PriceInput {
    fn market(&self) -> Option<MarketSnapshot> {
        self.current_price.map(|price| MarketSnapshot {
            crop_name: self.crop_name.clone(),
            current_price: price,
            trend: Trend::Stable,
            last_updated: DateTime::<Utc>::default(),
        })
    }

    fn msp(&self) -> Option<MspRecord> {
        self.msp.map(|msp| MspRecord {
            crop_name: self.crop_name.clone(),
            msp,
            unit: String::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationInput {
    #[serde(flatten)]
    conditions: ConditionsInput,
    #[serde(default)]
    market: PriceInput,
    soil_health: SoilHealth,
}

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn weather_alerts_json(conditions_json: &str) -> Result<String, String> {
    let input: ConditionsInput = parse("conditions", conditions_json)?;
    render(&rules::weather_alerts(&input.into_conditions()))
}

fn market_alerts_json(price_json: &str) -> Result<String, String> {
    let input: PriceInput = parse("price", price_json)?;
    render(&rules::market_alerts(
        input.market().as_ref(),
        input.msp().as_ref(),
    ))
}

fn recommendations_json(input_json: &str) -> Result<String, String> {
    let input: RecommendationInput = parse("recommendation input", input_json)?;
    let market = input.market.market();
    let msp = input.market.msp();
    render(&recommendations::generate(
        &input.conditions.into_conditions(),
        market.as_ref(),
        msp.as_ref(),
        input.soil_health,
    ))
}

/// Weather alerts for `{temperature_celsius, humidity_percent, wind_speed_kmh}`
#[wasm_bindgen]
pub fn evaluate_weather_alerts(conditions_json: &str) -> Result<String, JsValue> {
    weather_alerts_json(conditions_json).map_err(|e| JsValue::from_str(&e))
}

/// Market alerts for `{crop_name, current_price, msp}`
#[wasm_bindgen]
pub fn evaluate_market_alerts(price_json: &str) -> Result<String, JsValue> {
    market_alerts_json(price_json).map_err(|e| JsValue::from_str(&e))
}

/// Ordered recommendation list as a JSON array of strings
#[wasm_bindgen]
pub fn generate_recommendations(input_json: &str) -> Result<String, JsValue> {
    recommendations_json(input_json).map_err(|e| JsValue::from_str(&e))
}

/// Daily tip text for a crop; unknown soil grades get no soil clause
#[wasm_bindgen]
pub fn daily_tip(crop_name: &str, soil_health: &str) -> String {
    let soil_health = soil_health.parse().unwrap_or(SoilHealth::Good);
    recommendations::daily_tip(crop_name, soil_health)
}

/// Validate an Indian pincode
#[wasm_bindgen]
pub fn is_valid_pincode(pincode: &str) -> bool {
    validate_pincode(pincode).is_ok()
}
