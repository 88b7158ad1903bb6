//! Registration census for the admin dashboard

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{percentage, Subject};

/// Number of farmers sharing a crop or pincode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupCount {
    pub name: String,
    pub count: i64,
}

/// A registration as listed on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentRegistration {
    pub name: String,
    pub crop_name: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Subject> for RecentRegistration {
    fn from(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            crop_name: subject.crop_name.clone(),
            pincode: subject.pincode.clone(),
            created_at: subject.created_at,
        }
    }
}

/// Counts over every registered farmer, active or not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectCensus {
    pub total: i64,
    pub active: i64,
    /// Newest registrations first
    pub recent_registrations: Vec<RecentRegistration>,
    /// Most common crops, ties broken by name
    pub top_crops: Vec<GroupCount>,
    pub top_pincodes: Vec<GroupCount>,
}

impl SubjectCensus {
    /// Tally a full subject list, keeping `limit` entries per ranking
    pub fn tally(subjects: &[Subject], limit: usize) -> Self {
        let mut newest: Vec<&Subject> = subjects.iter().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            total: subjects.len() as i64,
            active: subjects.iter().filter(|s| s.is_active).count() as i64,
            recent_registrations: newest
                .into_iter()
                .take(limit)
                .map(RecentRegistration::from)
                .collect(),
            top_crops: top_groups(subjects.iter().map(|s| s.crop_name.as_str()), limit),
            top_pincodes: top_groups(subjects.iter().map(|s| s.pincode.as_str()), limit),
        }
    }
}

fn top_groups<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<GroupCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(name, count)| GroupCount {
            name: name.to_string(),
            count,
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    groups.truncate(limit);
    groups
}

/// Admin dashboard summary of the registered fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_farmers: i64,
    pub active_farmers: i64,
    /// Percentage of active farmers with two decimals; zero with no farmers
    pub active_rate: Decimal,
    pub recent_registrations: Vec<RecentRegistration>,
    pub top_crops: Vec<GroupCount>,
    pub top_pincodes: Vec<GroupCount>,
    pub generated_at: DateTime<Utc>,
}

impl FleetSummary {
    pub fn from_census(census: SubjectCensus, generated_at: DateTime<Utc>) -> Self {
        Self {
            total_farmers: census.total,
            active_farmers: census.active,
            active_rate: percentage(census.active, census.total),
            recent_registrations: census.recent_registrations,
            top_crops: census.top_crops,
            top_pincodes: census.top_pincodes,
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SoilHealth, SoilType};
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    fn farmer(name: &str, pincode: &str, crop: &str, days_ago: i64, active: bool) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mobile_number: "9876543210".to_string(),
            pincode: pincode.to_string(),
            crop_name: crop.to_string(),
            soil_type: SoilType::Clay,
            soil_health: SoilHealth::Fair,
            seed_sowing_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            is_active: active,
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_tally_ranks_groups_and_registrations() {
        let subjects = vec![
            farmer("A", "110001", "Wheat", 5, true),
            farmer("B", "110001", "Rice", 1, true),
            farmer("C", "560001", "Rice", 3, false),
            farmer("D", "400001", "Cotton", 2, true),
        ];

        let census = SubjectCensus::tally(&subjects, 2);

        assert_eq!(census.total, 4);
        assert_eq!(census.active, 3);
        let names: Vec<&str> = census
            .recent_registrations
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "D"]);
        assert_eq!(
            census.top_crops,
            vec![
                GroupCount { name: "Rice".to_string(), count: 2 },
                GroupCount { name: "Cotton".to_string(), count: 1 },
            ]
        );
        assert_eq!(census.top_pincodes[0].name, "110001");
        assert_eq!(census.top_pincodes[0].count, 2);
    }

    #[test]
    fn test_summary_active_rate() {
        let subjects = vec![
            farmer("A", "110001", "Wheat", 1, true),
            farmer("B", "110001", "Wheat", 1, true),
            farmer("C", "110001", "Wheat", 1, false),
        ];

        let summary = FleetSummary::from_census(SubjectCensus::tally(&subjects, 5), Utc::now());

        assert_eq!(summary.active_rate.to_string(), "66.67");
        assert_eq!(summary.top_crops.len(), 1);
    }

    #[test]
    fn test_empty_fleet_has_zero_rate() {
        let summary = FleetSummary::from_census(SubjectCensus::tally(&[], 5), Utc::now());

        assert_eq!(summary.total_farmers, 0);
        assert_eq!(summary.active_rate, Decimal::ZERO);
        assert!(summary.recent_registrations.is_empty());
    }
}
