//! Alert-session fingerprints
//!
//! A dashboard view that raises warnings dispatches at most once per
//! fingerprint per day. The fingerprint covers the subject, the local day and
//! the set of warning kinds, so a new kind of warning on the same day is
//! still sent.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use shared::models::Alert;

/// SHA-256 hex of `subject | day | sorted distinct warning kinds`
pub fn fingerprint(subject_id: Uuid, day: NaiveDate, warnings: &[Alert]) -> String {
    let mut kinds: Vec<&str> = warnings
        .iter()
        .filter(|a| a.is_warning())
        .map(|a| a.kind.as_str())
        .collect();
    kinds.sort_unstable();
    kinds.dedup();

    let mut hasher = Sha256::new();
    hasher.update(subject_id.as_bytes());
    hasher.update(b"|");
    hasher.update(day.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(kinds.join(",").as_bytes());
    format!("{:x}", hasher.finalize())
}
