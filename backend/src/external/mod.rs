//! External collaborators: weather and market data sources, SMS channels

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub mod market;
pub mod sms;
pub mod weather;

pub use market::{MarketDataset, MarketSource, StaticMarketSource};
pub use sms::{ChannelReceipt, GatewayChannel, LogOnlyChannel, NotConfiguredChannel, SmsChannel};
pub use weather::{FixtureConditions, FixtureWeatherSource, RandomWeatherSource, WeatherSource};

/// Bound a source call; an elapsed timeout surfaces as `DataUnavailable`
pub async fn bounded<T, F>(timeout: Duration, what: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::DataUnavailable(format!(
            "{} timed out after {}ms",
            what,
            timeout.as_millis()
        ))),
    }
}
