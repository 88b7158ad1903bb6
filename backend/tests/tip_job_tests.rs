//! Daily tip job tests

mod common;

use std::sync::Arc;

use common::{subject, FlakyLog, HarnessBuilder};
use farmhub_backend::external::FixtureWeatherSource;
use farmhub_backend::store::NotificationLog;
use shared::{MessageCategory, SoilHealth};

#[tokio::test]
async fn test_tips_follow_crop_and_soil() {
    let basmati = subject("Lakshmi", "700001", "Basmati Rice", SoilHealth::Good);
    let wheat = subject("Ramesh", "110001", "Wheat", SoilHealth::Poor);
    let log = Arc::new(FlakyLog::default());

    let harness = HarnessBuilder::new(FixtureWeatherSource::new())
        .subjects(vec![basmati.clone(), wheat.clone()])
        .log(log.clone())
        .build();

    let report = harness
        .state
        .tip_job
        .run_once(&harness.shutdown)
        .await
        .unwrap();

    assert_eq!(report.total_subjects, 2);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 0);
    assert!(report.finished_at >= report.started_at);

    let records = log.inner.records().await;
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.message_type == MessageCategory::CropAdvice));

    let rice_tip = records.iter().find(|r| r.farmer_id == basmati.id).unwrap();
    assert!(rice_tip.message.starts_with("Daily Farming Tip: Rice farming tip:"));
    assert!(rice_tip.message.ends_with(" - FarmHub"));

    let wheat_tip = records.iter().find(|r| r.farmer_id == wheat.id).unwrap();
    assert!(wheat_tip.message.contains("Wheat farming tip"));
    assert!(wheat_tip.message.contains("organic matter"));
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_run() {
    let first = subject("Asha", "110001", "Rice", SoilHealth::Good);
    let second = subject("Bharat", "110001", "Cotton", SoilHealth::Good);
    let third = subject("Chitra", "110001", "Maize", SoilHealth::Good);
    let log = Arc::new(FlakyLog::failing_for([second.id]));

    let harness = HarnessBuilder::new(FixtureWeatherSource::new())
        .subjects(vec![first, second, third])
        .log(log.clone())
        .build();

    let report = harness
        .state
        .tip_job
        .run_once(&harness.shutdown)
        .await
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(log.inner.records().await.len(), 2);
}

#[tokio::test]
async fn test_inactive_subjects_get_no_tip() {
    let active = subject("Asha", "110001", "Rice", SoilHealth::Good);
    let mut inactive = subject("Bharat", "110001", "Wheat", SoilHealth::Good);
    inactive.is_active = false;

    let harness = HarnessBuilder::new(FixtureWeatherSource::new())
        .subjects(vec![active.clone(), inactive])
        .build();

    let report = harness
        .state
        .tip_job
        .run_once(&harness.shutdown)
        .await
        .unwrap();

    assert_eq!(report.total_subjects, 1);
    let records = harness.log.recent(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].farmer_id, active.id);
}

#[tokio::test]
async fn test_cancelled_run_dispatches_nothing() {
    let harness = HarnessBuilder::new(FixtureWeatherSource::new())
        .subjects(vec![
            subject("Asha", "110001", "Rice", SoilHealth::Good),
            subject("Bharat", "110001", "Wheat", SoilHealth::Good),
        ])
        .build();
    harness.shutdown.cancel();

    let report = harness
        .state
        .tip_job
        .run_once(&harness.shutdown)
        .await
        .unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(report.skipped, 2);
    assert!(harness.log.recent(10).await.unwrap().is_empty());
}
