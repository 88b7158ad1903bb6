//! HTTP handlers for admin alerting and notification endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use shared::models::{FleetAlerts, FleetSummary, LocationWeather, NotificationStatistics};
use shared::MessageCategory;

use crate::error::{AppError, AppResult};
use crate::services::{BulkCriteria, BulkDispatchReport, TipRunReport};
use crate::AppState;

/// Optional location filter
#[derive(Debug, Deserialize)]
pub struct PincodeQuery {
    pub pincode: Option<String>,
}

/// Weather and alerts for a pincode
pub async fn get_location_weather(
    State(state): State<AppState>,
    Query(query): Query<PincodeQuery>,
) -> AppResult<Json<LocationWeather>> {
    let pincode = query
        .pincode
        .ok_or_else(|| AppError::validation("pincode", "Pincode is required"))?;
    let weather = state.aggregator.weather_for_location(&pincode).await?;
    Ok(Json(weather))
}

/// Alerts for one pincode, or for every major location
pub async fn get_fleet_alerts(
    State(state): State<AppState>,
    Query(query): Query<PincodeQuery>,
) -> AppResult<Json<FleetAlerts>> {
    let alerts = state
        .aggregator
        .evaluate_fleet_alerts(query.pincode.as_deref().filter(|p| !p.is_empty()))
        .await?;
    Ok(Json(alerts))
}

/// Bulk notification request
#[derive(Debug, Deserialize, Validate)]
pub struct BulkNotificationRequest {
    #[validate(length(max = 1000, message = "Message is too long"))]
    pub message: Option<String>,
    pub message_type: Option<String>,
    pub farmer_ids: Option<Vec<Uuid>>,
    #[validate(length(equal = 6, message = "Pincode must be exactly 6 digits"))]
    pub pincode: Option<String>,
    pub crop_name: Option<String>,
}

impl BulkNotificationRequest {
    /// Split into recipients, text and category
    pub fn into_parts(self) -> AppResult<(BulkCriteria, String, MessageCategory)> {
        if let Err(errors) = self.validate() {
            let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
            fields.sort_by_key(|(field, _)| *field);
            if let Some((field, errs)) = fields.into_iter().next() {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                return Err(AppError::validation(field, message));
            }
        }

        let required = "Message and message type are required";
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::validation("message", required))?;
        let category = self
            .message_type
            .ok_or_else(|| AppError::validation("message_type", required))?
            .parse::<MessageCategory>()
            .map_err(|e| AppError::validation("message_type", e.to_string()))?;

        let criteria = match (self.farmer_ids, self.pincode) {
            (Some(ids), _) if !ids.is_empty() => BulkCriteria::SubjectIds(ids),
            (_, Some(pincode)) => BulkCriteria::Location {
                pincode,
                crop: self.crop_name.filter(|c| !c.is_empty()),
            },
            _ => {
                return Err(AppError::validation(
                    "farmer_ids",
                    "Either farmer IDs or pincode is required",
                ))
            }
        };

        Ok((criteria, message, category))
    }
}

/// Send one message to many farmers
pub async fn send_bulk_notification(
    State(state): State<AppState>,
    Json(request): Json<BulkNotificationRequest>,
) -> AppResult<Json<BulkDispatchReport>> {
    let (criteria, message, category) = request.into_parts()?;
    let report = state
        .aggregator
        .dispatch_bulk(&criteria, &message, category)
        .await?;
    Ok(Json(report))
}

/// Dispatch statistics
pub async fn get_notification_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<NotificationStatistics>> {
    let statistics = state.aggregator.notification_statistics().await?;
    Ok(Json(statistics))
}

/// Registration dashboard summary
pub async fn get_fleet_summary(State(state): State<AppState>) -> AppResult<Json<FleetSummary>> {
    let summary = state.aggregator.fleet_summary().await?;
    Ok(Json(summary))
}

/// Run the daily tip job now
pub async fn run_daily_tips(State(state): State<AppState>) -> AppResult<Json<TipRunReport>> {
    let report = state.tip_job.run_once(&state.shutdown).await?;
    Ok(Json(report))
}
