//! Route definitions for the FarmHub engine

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Farmer dashboard
        .nest("/farmers", farmer_routes())
        // Admin alerting and notifications
        .nest("/admin", admin_routes())
}

/// Farmer dashboard routes
fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/:farmer_id/overview", get(handlers::get_overview))
        .route("/:farmer_id/weather", get(handlers::get_weather))
        .route("/:farmer_id/market", get(handlers::get_market))
}

/// Admin routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_fleet_summary))
        .route("/weather", get(handlers::get_location_weather))
        .route("/alerts", get(handlers::get_fleet_alerts))
        .route("/notifications/bulk", post(handlers::send_bulk_notification))
        .route(
            "/notifications/statistics",
            get(handlers::get_notification_statistics),
        )
        .route("/tips/run", post(handlers::run_daily_tips))
}
