//! Common enumerations used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a stored or submitted label does not name a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `Display` and `FromStr` over the human-readable labels that are
/// also used for storage and the JSON wire format.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Alert severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
    Success,
}

impl Severity {
    /// Presentation rank; higher sorts first
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Success => 1,
        }
    }
}

labelled_enum!(Severity, "severity", {
    Warning => "warning",
    Info => "info",
    Success => "success",
});

/// Market price trend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

labelled_enum!(Trend, "trend", {
    Up => "up",
    Down => "down",
    Stable => "stable",
});

/// Category of an outbound notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MessageCategory {
    #[serde(rename = "Weather Alert")]
    WeatherAlert,
    #[serde(rename = "Market Update")]
    MarketUpdate,
    #[serde(rename = "Crop Advice")]
    CropAdvice,
    #[serde(rename = "General")]
    General,
}

labelled_enum!(MessageCategory, "message category", {
    WeatherAlert => "Weather Alert",
    MarketUpdate => "Market Update",
    CropAdvice => "Crop Advice",
    General => "General",
});

/// Delivery status of a notification record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Failed,
    #[serde(rename = "Not Configured")]
    NotConfigured,
    Logged,
}

impl DeliveryStatus {
    /// Whether the channel accepted the message. `Logged` counts: the
    /// log-only channel accepting a message is its success path.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::Sent | DeliveryStatus::Delivered | DeliveryStatus::Logged
        )
    }
}

labelled_enum!(DeliveryStatus, "delivery status", {
    Sent => "Sent",
    Delivered => "Delivered",
    Failed => "Failed",
    NotConfigured => "Not Configured",
    Logged => "Logged",
});

/// Soil classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Silt,
    Peaty,
    Chalky,
}

labelled_enum!(SoilType, "soil type", {
    Clay => "Clay",
    Sandy => "Sandy",
    Loamy => "Loamy",
    Silt => "Silt",
    Peaty => "Peaty",
    Chalky => "Chalky",
});

/// Soil health grade; `Poor` is the lowest tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SoilHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

labelled_enum!(SoilHealth, "soil health", {
    Excellent => "Excellent",
    Good => "Good",
    Fair => "Fair",
    Poor => "Poor",
});
