//! Inactivity filter: decides which users are eligible for deletion.
//!
//! A user is eligible when its status is one of [`INACTIVE_STATUSES`]
//! (compared case-insensitively) and its last activity is strictly older
//! than the threshold. Last activity is `updatedAt`, or `createdAt` when the
//! record was never updated.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use port_client::Entity;
use serde_json::Value;
use tracing::{debug, warn};

/// Status values that mark a user as inactive.
pub const INACTIVE_STATUSES: [&str; 2] = ["inactive", "disabled"];

/// Default inactivity threshold in days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;

/// Why a record was or was not selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Inactive status and no activity within the threshold
    Eligible { age_days: i64 },
    /// Status is not one of the inactive values
    StatusNotMatched,
    /// Inactive status but active within the threshold
    RecentlyActive { age_days: i64 },
    /// Neither `updatedAt` nor `createdAt` is present
    MissingTimestamp,
    /// The activity timestamp could not be parsed
    UnparsableTimestamp(String),
}

impl FilterDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// A record the filter did not select, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub entity: Entity,
    pub decision: FilterDecision,
}

/// Result of running the filter over a user list.
#[derive(Debug, Default)]
pub struct Selection {
    /// Records to back up and delete, in input order
    pub eligible: Vec<Entity>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone)]
pub struct InactivityFilter {
    threshold_days: u32,
}

impl Default for InactivityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_DAYS)
    }
}

impl InactivityFilter {
    pub fn new(threshold_days: u32) -> Self {
        Self { threshold_days }
    }

    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Decide whether one record is eligible at time `now`.
    pub fn evaluate(&self, entity: &Entity, now: DateTime<Utc>) -> FilterDecision {
        if !has_inactive_status(entity) {
            return FilterDecision::StatusNotMatched;
        }

        let Some(raw) = last_activity(entity) else {
            return FilterDecision::MissingTimestamp;
        };

        let Some(last_active) = parse_timestamp(raw) else {
            return FilterDecision::UnparsableTimestamp(raw.to_string());
        };

        let age = now - last_active;
        let age_days = age.num_days();

        if age > Duration::days(i64::from(self.threshold_days)) {
            FilterDecision::Eligible { age_days }
        } else {
            FilterDecision::RecentlyActive { age_days }
        }
    }

    /// Split `entities` into eligible and skipped records.
    pub fn select(&self, entities: Vec<Entity>, now: DateTime<Utc>) -> Selection {
        let mut selection = Selection::default();

        for entity in entities {
            let decision = self.evaluate(&entity, now);
            match &decision {
                FilterDecision::Eligible { age_days } => {
                    debug!(
                        identifier = %entity.identifier,
                        age_days,
                        "User eligible for deletion"
                    );
                    selection.eligible.push(entity);
                    continue;
                }
                FilterDecision::UnparsableTimestamp(raw) => {
                    warn!(
                        identifier = %entity.identifier,
                        timestamp = %raw,
                        "Could not parse activity timestamp, skipping user"
                    );
                }
                FilterDecision::MissingTimestamp => {
                    warn!(
                        identifier = %entity.identifier,
                        "User has no updatedAt or createdAt, skipping"
                    );
                }
                FilterDecision::StatusNotMatched | FilterDecision::RecentlyActive { .. } => {}
            }
            selection.skipped.push(SkippedRecord { entity, decision });
        }

        selection
    }
}

/// Whether the record's status is one of [`INACTIVE_STATUSES`].
pub fn has_inactive_status(entity: &Entity) -> bool {
    match entity.field("status") {
        Some(Value::String(status)) => {
            let status = status.trim();
            INACTIVE_STATUSES
                .iter()
                .any(|s| s.eq_ignore_ascii_case(status))
        }
        _ => false,
    }
}

/// Raw last-activity timestamp: `updatedAt`, falling back to `createdAt`.
pub fn last_activity(entity: &Entity) -> Option<&str> {
    entity
        .updated_at
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entity.created_at.as_deref().filter(|s| !s.trim().is_empty()))
}

/// Parse the timestamp formats Port emits.
///
/// Accepts RFC 3339, ISO datetimes without an offset (taken as UTC) and
/// plain dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
