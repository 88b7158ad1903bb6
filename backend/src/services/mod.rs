//! Engine services for the FarmHub platform

pub mod aggregator;
pub mod alert_session;
pub mod dispatcher;
pub mod tips;

pub use aggregator::{AggregatorSettings, AlertAggregator, BulkCriteria, Stores};
pub use dispatcher::{BulkDispatchReport, NotificationDispatcher, Recipient, RecipientOutcome};
pub use tips::{spawn_scheduler, DailyTipJob, TipRunReport, TipSchedule};
