//! Registered farmer models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SoilHealth, SoilType};

/// A registered farmer. Owned by the account subsystem; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    /// Contact address for notifications (mobile number)
    pub mobile_number: String,
    /// Location key (postal code)
    pub pincode: String,
    pub crop_name: String,
    pub soil_type: SoilType,
    pub soil_health: SoilHealth,
    pub seed_sowing_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Subject fields returned alongside an evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub name: String,
    pub crop_name: String,
    pub soil_type: SoilType,
    pub soil_health: SoilHealth,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            crop_name: subject.crop_name.clone(),
            soil_type: subject.soil_type,
            soil_health: subject.soil_health,
        }
    }
}
