//! FarmHub farming intelligence and alerting engine
//!
//! Turns weather and market observations into prioritized alerts,
//! recommendations and outbound notifications, with a persisted audit trail
//! and a scheduled daily tip job.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::{MarketSource, SmsChannel, WeatherSource};
use services::{AggregatorSettings, AlertAggregator, DailyTipJob, NotificationDispatcher, Stores};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<AlertAggregator>,
    pub tip_job: Arc<DailyTipJob>,
    pub config: Arc<Config>,
    /// Cancelled when the process starts shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the engine services over the given collaborators
    pub fn new(
        config: Config,
        stores: Stores,
        weather: Arc<dyn WeatherSource>,
        market: Arc<dyn MarketSource>,
        channel: Arc<dyn SmsChannel>,
        shutdown: CancellationToken,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(channel, stores.notifications.clone());
        let tip_job = DailyTipJob::new(stores.subjects.clone(), dispatcher.clone());
        let aggregator = AlertAggregator::new(
            stores,
            weather,
            market,
            dispatcher,
            AggregatorSettings::from_config(&config),
        );

        Self {
            aggregator: Arc::new(aggregator),
            tip_job: Arc::new(tip_job),
            config: Arc::new(config),
            shutdown,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "FarmHub Alerting Engine API v1.0"
}
