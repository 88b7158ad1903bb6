//! HTTP surface tests driven through the full router

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{subject, HarnessBuilder};
use farmhub_backend::create_app;
use farmhub_backend::external::{FixtureConditions, FixtureWeatherSource};
use shared::{models::Subject, SoilHealth};

fn app_with(subjects: Vec<Subject>) -> Router {
    let weather =
        FixtureWeatherSource::new().with_location("110001", FixtureConditions::new(38, 25, 10));
    let harness = HarnessBuilder::new(weather).subjects(subjects).build();
    create_app(harness.state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app_with(Vec::new()), get("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_overview_json_shape() {
    let farmer = subject("Ramesh", "110001", "Wheat", SoilHealth::Poor);
    let uri = format!("/api/v1/farmers/{}/overview", farmer.id);

    let (status, body) = send(app_with(vec![farmer]), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["farmer"]["name"], "Ramesh");
    assert_eq!(body["alerts"][0]["type"], "High Temperature");
    assert_eq!(body["alerts"][0]["severity"], "warning");
    assert_eq!(body["notification"]["state"], "dispatched");
    assert_eq!(body["notification"]["outcome"]["success"], true);
}

#[tokio::test]
async fn test_unknown_farmer_is_404() {
    let uri = format!("/api/v1/farmers/{}/weather", Uuid::new_v4());

    let (status, body) = send(app_with(Vec::new()), get(&uri)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unavailable_weather_is_503() {
    let farmer = subject("Priya", "560001", "Maize", SoilHealth::Fair);
    let uri = format!("/api/v1/farmers/{}/weather", farmer.id);

    let (status, body) = send(app_with(vec![farmer]), get(&uri)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_location_weather_requires_pincode() {
    let (status, body) = send(app_with(Vec::new()), get("/api/v1/admin/weather")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "pincode");

    let (status, body) = send(
        app_with(Vec::new()),
        get("/api/v1/admin/weather?pincode=110001"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"]["location"], "Area 110001");
}

#[tokio::test]
async fn test_bulk_without_message_is_400() {
    let (status, body) = send(
        app_with(Vec::new()),
        post_json(
            "/api/v1/admin/notifications/bulk",
            json!({ "message_type": "General", "pincode": "110001" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Message and message type are required");
}

#[tokio::test]
async fn test_bulk_by_location() {
    let farmer = subject("Asha", "110001", "Rice", SoilHealth::Good);
    let id = farmer.id.to_string();

    let (status, body) = send(
        app_with(vec![farmer]),
        post_json(
            "/api/v1/admin/notifications/bulk",
            json!({
                "message": "Procurement centre open",
                "message_type": "Market Update",
                "pincode": "110001",
                "crop_name": "rice"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sent"], 1);
    assert_eq!(body["total_failed"], 0);
    assert_eq!(body["results"][0]["farmer_id"], id);
    assert_eq!(body["results"][0]["success"], true);
}

#[tokio::test]
async fn test_statistics_after_tip_run() {
    let harness = HarnessBuilder::new(FixtureWeatherSource::new())
        .subjects(vec![subject("Asha", "110001", "Rice", SoilHealth::Good)])
        .build();
    let app = create_app(harness.state);

    let (status, body) = send(app.clone(), post_json("/api/v1/admin/tips/run", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);

    let (status, body) = send(app, get("/api/v1/admin/notifications/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["by_category"][0]["message_type"], "Crop Advice");
}

#[tokio::test]
async fn test_fleet_alerts_reject_bad_pincode() {
    let (status, body) = send(
        app_with(Vec::new()),
        get("/api/v1/admin/alerts?pincode=000001"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "pincode");
}

#[tokio::test]
async fn test_dashboard_summary() {
    let mut retired = subject("Bharat", "110001", "Wheat", SoilHealth::Good);
    retired.is_active = false;
    let subjects = vec![
        subject("Asha", "110001", "Rice", SoilHealth::Good),
        retired,
        subject("Chitra", "560001", "Rice", SoilHealth::Poor),
    ];

    let (status, body) = send(app_with(subjects), get("/api/v1/admin/dashboard")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_farmers"], 3);
    assert_eq!(body["active_farmers"], 2);
    assert_eq!(body["active_rate"], "66.67");
    assert_eq!(body["top_crops"][0], json!({"name": "Rice", "count": 2}));
    assert_eq!(body["top_pincodes"][0]["name"], "110001");
    assert_eq!(body["recent_registrations"].as_array().unwrap().len(), 3);
    assert!(body["generated_at"].is_string());
}
