//! Threshold rules that turn weather and market observations into alerts
//!
//! Every rule is evaluated independently; all that match are emitted in the
//! order they are declared here.

use rust_decimal::Decimal;

use crate::models::{kinds, Alert, CurrentConditions, MarketSnapshot, MspRecord, TopCrop};
use crate::types::Severity;

/// Above this temperature (°C) crops need extra water
pub const HIGH_TEMPERATURE_C: i64 = 35;
/// Below this temperature (°C) frost protection is advised
pub const LOW_TEMPERATURE_C: i64 = 10;
/// Relative humidity (%) under which irrigation should increase
pub const LOW_HUMIDITY_PERCENT: i32 = 30;
/// Wind speed (km/h) above which structures should be secured
pub const HIGH_WIND_KMH: i64 = 20;

/// Price premium over MSP that counts as a selling opportunity (×1.2)
pub fn high_price_factor() -> Decimal {
    Decimal::new(12, 1)
}

/// Evaluate the weather rules against current conditions
pub fn weather_alerts(current: &CurrentConditions) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let temperature = current.temperature_celsius;

    if temperature > Decimal::from(HIGH_TEMPERATURE_C) {
        alerts.push(Alert::new(
            kinds::HIGH_TEMPERATURE,
            format!(
                "High temperature alert ({}°C)! Consider additional irrigation.",
                temperature
            ),
            Severity::Warning,
        ));
    }

    if temperature < Decimal::from(LOW_TEMPERATURE_C) {
        alerts.push(Alert::new(
            kinds::LOW_TEMPERATURE,
            format!(
                "Low temperature alert ({}°C)! Protect crops from frost.",
                temperature
            ),
            Severity::Warning,
        ));
    }

    if current.humidity_percent < LOW_HUMIDITY_PERCENT {
        alerts.push(Alert::new(
            kinds::LOW_HUMIDITY,
            format!(
                "Low humidity alert ({}%)! Increase irrigation frequency.",
                current.humidity_percent
            ),
            Severity::Info,
        ));
    }

    if current.wind_speed_kmh > Decimal::from(HIGH_WIND_KMH) {
        alerts.push(Alert::new(
            kinds::HIGH_WIND,
            format!(
                "High wind alert ({} km/h)! Secure crops and structures.",
                current.wind_speed_kmh
            ),
            Severity::Warning,
        ));
    }

    alerts
}

/// Evaluate the market rules. Both a price and an MSP are required; when
/// either is missing no market alert is possible.
pub fn market_alerts(market: Option<&MarketSnapshot>, msp: Option<&MspRecord>) -> Vec<Alert> {
    let (Some(market), Some(msp)) = (market, msp) else {
        return Vec::new();
    };

    let price = market.current_price;
    let mut alerts = Vec::new();

    if price < msp.msp {
        alerts.push(Alert::new(
            kinds::LOW_PRICE,
            format!(
                "Current price (₹{}) is below MSP (₹{}). Consider holding or government procurement.",
                price, msp.msp
            ),
            Severity::Warning,
        ));
    }

    if price > msp.msp * high_price_factor() {
        alerts.push(Alert::new(
            kinds::HIGH_PRICE,
            format!(
                "Current price (₹{}) is significantly above MSP (₹{}). Good time to sell.",
                price, msp.msp
            ),
            Severity::Info,
        ));
    }

    alerts
}

/// Low-price check for one crop of a location's top-crop list, naming the crop
pub fn top_crop_alert(crop: &TopCrop, msp: Option<&MspRecord>) -> Option<Alert> {
    let msp = msp?;
    (crop.current_price < msp.msp).then(|| {
        Alert::new(
            kinds::LOW_PRICE,
            format!(
                "{} price (₹{}) below MSP (₹{})",
                crop.name, crop.current_price, msp.msp
            ),
            Severity::Warning,
        )
    })
}
