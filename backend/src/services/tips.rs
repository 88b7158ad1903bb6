//! Scheduled daily farming tips
//!
//! `DailyTipJob::run_once` holds the business logic; `spawn_scheduler` only
//! decides when to call it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::recommendations::daily_tip;
use shared::MessageCategory;

use crate::config::TipJobConfig;
use crate::error::{AppError, AppResult};
use crate::services::dispatcher::NotificationDispatcher;
use crate::store::SubjectStore;

/// Summary of one tip run
#[derive(Debug, Clone, Serialize)]
pub struct TipRunReport {
    pub total_subjects: usize,
    pub sent: usize,
    pub failed: usize,
    /// Subjects left untouched because the run was cancelled
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Daily tip job
#[derive(Clone)]
pub struct DailyTipJob {
    subjects: Arc<dyn SubjectStore>,
    dispatcher: NotificationDispatcher,
}

impl DailyTipJob {
    pub fn new(subjects: Arc<dyn SubjectStore>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            subjects,
            dispatcher,
        }
    }

    /// Send today's tip to every active subject.
    ///
    /// A failed dispatch is logged and counted; the run moves on. Cancellation
    /// is checked between subjects, so a record is never left half-written.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn run_once(&self, cancel: &CancellationToken) -> AppResult<TipRunReport> {
        let started_at = Utc::now();
        let subjects = self.subjects.list_active().await?;
        tracing::info!(subjects = subjects.len(), "Sending daily farming tips");

        let mut sent = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for (index, subject) in subjects.iter().enumerate() {
            if cancel.is_cancelled() {
                skipped = subjects.len() - index;
                tracing::warn!(skipped, "Tip run cancelled");
                break;
            }

            let message = daily_tip(&subject.crop_name, subject.soil_health);
            let outcome = self
                .dispatcher
                .dispatch_to(subject, &message, MessageCategory::CropAdvice)
                .await;

            if outcome.success {
                sent += 1;
                tracing::debug!(subject_id = %subject.id, "Daily tip sent");
            } else {
                failed += 1;
                tracing::error!(
                    subject_id = %subject.id,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Error sending daily tip"
                );
            }
        }

        tracing::info!(sent, failed, "Daily farming tips finished");

        Ok(TipRunReport {
            total_subjects: subjects.len(),
            sent,
            failed,
            skipped,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Fixed local time of day at which the job runs
#[derive(Debug, Clone, Copy)]
pub struct TipSchedule {
    at: NaiveTime,
    offset: FixedOffset,
}

impl TipSchedule {
    pub fn new(hour: u32, minute: u32, offset: FixedOffset) -> AppResult<Self> {
        let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            AppError::Configuration(format!("invalid tip job time {:02}:{:02}", hour, minute))
        })?;
        Ok(Self { at, offset })
    }

    pub fn from_config(config: &TipJobConfig) -> AppResult<Self> {
        Self::new(config.hour, config.minute, config.local_offset())
    }

    /// First scheduled instant strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_now = now.with_timezone(&self.offset);
        let mut candidate = local_now.date_naive().and_time(self.at);
        if candidate <= local_now.naive_local() {
            candidate += ChronoDuration::days(1);
        }

        // A fixed offset maps every local time to exactly one instant
        self.offset
            .from_local_datetime(&candidate)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or(now + ChronoDuration::days(1))
    }
}

/// Run the job at every scheduled instant until `cancel` fires
pub fn spawn_scheduler(
    job: DailyTipJob,
    schedule: TipSchedule,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = schedule.next_run_after(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tracing::info!(next_run = %next, "Daily tip job scheduled");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Daily tip scheduler stopped");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            if let Err(e) = job.run_once(&cancel).await {
                tracing::error!(error = %e, "Error in daily tips job");
            }
        }
    })
}
