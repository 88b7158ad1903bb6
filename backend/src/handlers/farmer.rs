//! HTTP handlers for a farmer's personal dashboard

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{LocationWeather, SubjectMarketView, SubjectOverview};

use crate::error::AppResult;
use crate::AppState;

/// Full dashboard; may dispatch a consolidated alert
pub async fn get_overview(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<Json<SubjectOverview>> {
    let overview = state.aggregator.evaluate_for_subject(farmer_id).await?;
    Ok(Json(overview))
}

/// Weather at the farmer's location
pub async fn get_weather(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<Json<LocationWeather>> {
    let weather = state.aggregator.weather_for_subject(farmer_id).await?;
    Ok(Json(weather))
}

/// Crop price, MSP and top crops in the farmer's area
pub async fn get_market(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<Json<SubjectMarketView>> {
    let market = state.aggregator.market_for_subject(farmer_id).await?;
    Ok(Json(market))
}
