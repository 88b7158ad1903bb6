//! Alert models

use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Alert kind labels
pub mod kinds {
    pub const HIGH_TEMPERATURE: &str = "High Temperature";
    pub const LOW_TEMPERATURE: &str = "Low Temperature";
    pub const LOW_HUMIDITY: &str = "Low Humidity";
    pub const HIGH_WIND: &str = "High Wind";
    pub const LOW_PRICE: &str = "Low Price Alert";
    pub const HIGH_PRICE: &str = "High Price Alert";
}

/// A computed alert. Alerts live for one evaluation and are only persisted
/// through the notification they trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl Alert {
    pub fn new(kind: &str, message: String, severity: Severity) -> Self {
        Self {
            kind: kind.to_string(),
            message,
            severity,
            pincode: None,
        }
    }

    /// Tag the alert with the location it was computed for
    pub fn at(mut self, pincode: &str) -> Self {
        self.pincode = Some(pincode.to_string());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Order alerts by severity rank, highest first. The sort is stable, so
/// alerts of equal severity keep their discovery order.
pub fn sort_by_severity(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}
