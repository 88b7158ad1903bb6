//! Notification dispatcher
//!
//! Sends one message through the SMS channel and appends exactly one
//! notification record per attempt. A dispatch never raises: persistence and
//! channel failures come back as a failed `DispatchOutcome`. Malformed mobile
//! numbers are recorded as failed without reaching the channel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use shared::models::{DispatchOutcome, NewNotification, Subject};
use shared::validation::validate_mobile_number;
use shared::{DeliveryStatus, MessageCategory};

use crate::error::AppError;
use crate::external::{ChannelReceipt, SmsChannel};
use crate::store::NotificationLog;

/// Notification dispatcher service
#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn SmsChannel>,
    log: Arc<dyn NotificationLog>,
}

/// Outcome for one recipient of a bulk dispatch
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub mobile_number: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

impl RecipientOutcome {
    fn unresolved(farmer_id: Uuid, reason: &str) -> Self {
        Self {
            farmer_id,
            farmer_name: String::new(),
            mobile_number: String::new(),
            outcome: DispatchOutcome::failed(None, reason.to_string()),
        }
    }
}

/// One entry of a bulk request
#[derive(Debug, Clone)]
pub enum Recipient {
    Subject(Subject),
    /// A requested id with no subject to send to
    Unresolved { farmer_id: Uuid, reason: &'static str },
}

impl Recipient {
    /// Pair requested ids with the subjects found for them, keeping request order.
    /// Unknown ids and repeats of an earlier id stay unresolved.
    pub fn resolve(ids: &[Uuid], found: Vec<Subject>) -> Vec<Recipient> {
        let mut found: HashMap<Uuid, Subject> = found.into_iter().map(|s| (s.id, s)).collect();
        let mut seen = HashSet::with_capacity(ids.len());

        ids.iter()
            .map(|&farmer_id| {
                if !seen.insert(farmer_id) {
                    return Recipient::Unresolved {
                        farmer_id,
                        reason: "duplicate recipient",
                    };
                }
                match found.remove(&farmer_id) {
                    Some(subject) => Recipient::Subject(subject),
                    None => Recipient::Unresolved {
                        farmer_id,
                        reason: "not found",
                    },
                }
            })
            .collect()
    }
}

/// Ordered per-recipient outcomes of a bulk dispatch
#[derive(Debug, Clone, Serialize)]
pub struct BulkDispatchReport {
    pub total_sent: usize,
    pub total_failed: usize,
    pub results: Vec<RecipientOutcome>,
}

impl BulkDispatchReport {
    fn from_results(results: Vec<RecipientOutcome>) -> Self {
        let total_sent = results.iter().filter(|r| r.outcome.success).count();
        Self {
            total_sent,
            total_failed: results.len() - total_sent,
            results,
        }
    }
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn SmsChannel>, log: Arc<dyn NotificationLog>) -> Self {
        Self { channel, log }
    }

    /// Attempt one notification and record it
    #[tracing::instrument(skip(self, name, address, message), fields(category = %category))]
    pub async fn dispatch(
        &self,
        subject_id: Uuid,
        name: &str,
        address: &str,
        message: &str,
        category: MessageCategory,
    ) -> DispatchOutcome {
        let receipt = match validate_mobile_number(address) {
            Ok(()) => self.channel.send(address, message).await,
            Err(reason) => {
                tracing::warn!(%subject_id, "Skipping send to malformed mobile number");
                ChannelReceipt::rejected(
                    DeliveryStatus::Failed,
                    AppError::validation("mobile_number", reason),
                )
            }
        };

        let appended = self
            .log
            .append(NewNotification {
                farmer_id: subject_id,
                farmer_name: name.to_string(),
                farmer_phone: address.to_string(),
                message: message.to_string(),
                message_type: category,
                status: receipt.status,
                provider_ref: receipt.reference.clone(),
            })
            .await;

        match appended {
            Ok(record) if record.status.is_success() => DispatchOutcome::delivered(receipt.reference),
            Ok(record) => {
                let error = receipt
                    .error
                    .unwrap_or_else(|| format!("delivery status {}", record.status));
                tracing::warn!(%subject_id, status = %record.status, "Notification not delivered");
                DispatchOutcome::failed(receipt.reference, error)
            }
            Err(e) => {
                tracing::error!(%subject_id, error = %e, "Failed to record notification");
                DispatchOutcome::failed(receipt.reference, e.to_string())
            }
        }
    }

    /// Dispatch to a registered subject
    pub async fn dispatch_to(
        &self,
        subject: &Subject,
        message: &str,
        category: MessageCategory,
    ) -> DispatchOutcome {
        self.dispatch(subject.id, &subject.name, &subject.mobile_number, message, category)
            .await
    }

    /// Dispatch to each recipient in turn; results follow input order
    #[tracing::instrument(skip(self, recipients, message), fields(recipients = recipients.len()))]
    pub async fn dispatch_bulk(
        &self,
        recipients: &[Recipient],
        message: &str,
        category: MessageCategory,
    ) -> BulkDispatchReport {
        let mut results = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            let result = match recipient {
                Recipient::Subject(subject) => RecipientOutcome {
                    farmer_id: subject.id,
                    farmer_name: subject.name.clone(),
                    mobile_number: subject.mobile_number.clone(),
                    outcome: self.dispatch_to(subject, message, category).await,
                },
                Recipient::Unresolved { farmer_id, reason } => {
                    RecipientOutcome::unresolved(*farmer_id, reason)
                }
            };
            results.push(result);
        }

        let report = BulkDispatchReport::from_results(results);
        tracing::info!(
            sent = report.total_sent,
            failed = report.total_failed,
            "Bulk dispatch finished"
        );
        report
    }
}
