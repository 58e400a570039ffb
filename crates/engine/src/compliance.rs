//! Punctuality classification of a clock-in against an entity's policy.
//!
//! The clock-in is reduced to minutes since midnight in the reference
//! timezone and compared with the policy's nominal start plus grace.
//! Lateness is counted from the end of the grace period, so a 09:07
//! clock-in against 09:00 with 5 minutes of grace is 2 minutes late.
//! Policies describe single-day shifts: a clock-in after midnight for a shift
//! that started the previous evening is not wrapped around.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::clock::{minutes_since_midnight, time_minutes};
use crate::types::{Policy, ShiftRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    OnTime,
    Late,
    Unknown,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::OnTime => write!(f, "on time"),
            ComplianceStatus::Late => write!(f, "late"),
            ComplianceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Lateness past the end of the grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LateBy {
    pub hours: u32,
    pub minutes: u32,
}

impl LateBy {
    pub fn from_minutes(total: u32) -> Self {
        LateBy {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for LateBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours == 0 {
            write!(f, "{}m", self.minutes)
        } else {
            write!(f, "{}h {:02}m", self.hours, self.minutes)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    pub status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_by: Option<LateBy>,
}

impl ComplianceResult {
    pub fn unknown() -> Self {
        ComplianceResult {
            status: ComplianceStatus::Unknown,
            late_by: None,
        }
    }

    pub fn on_time() -> Self {
        ComplianceResult {
            status: ComplianceStatus::OnTime,
            late_by: None,
        }
    }

    pub fn late(minutes: u32) -> Self {
        ComplianceResult {
            status: ComplianceStatus::Late,
            late_by: Some(LateBy::from_minutes(minutes)),
        }
    }
}

/// Classify a single clock-in.
///
/// Returns `Unknown` when either the clock-in or the policy's nominal start
/// is missing, or when the clock-in has no wall-clock time in `tz`.
pub fn classify(
    clock_in: Option<OffsetDateTime>,
    policy: &Policy,
    tz: UtcOffset,
) -> ComplianceResult {
    let (Some(clock_in), Some(nominal)) = (clock_in, policy.nominal_start_of_day) else {
        return ComplianceResult::unknown();
    };

    let Some(clock_in_minutes) = minutes_since_midnight(clock_in, tz) else {
        tracing::debug!(%clock_in, "clock-in not representable in reference offset");
        return ComplianceResult::unknown();
    };
    let deadline = time_minutes(nominal) + policy.grace_minutes;

    if clock_in_minutes <= deadline {
        ComplianceResult::on_time()
    } else {
        ComplianceResult::late(clock_in_minutes - deadline)
    }
}

/// A shift together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftCompliance {
    pub entity_id: String,
    pub subject_id: String,
    #[serde(flatten)]
    pub result: ComplianceResult,
}

/// Per-entity counts of classified shifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceTally {
    pub on_time: usize,
    pub late: usize,
    pub unknown: usize,
    /// Sum of lateness over all late shifts.
    pub late_minutes: u32,
}

impl ComplianceTally {
    fn record(&mut self, result: &ComplianceResult) {
        match result.status {
            ComplianceStatus::OnTime => self.on_time += 1,
            ComplianceStatus::Late => {
                self.late += 1;
                self.late_minutes += result.late_by.map_or(0, |l| l.total_minutes());
            }
            ComplianceStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.on_time + self.late + self.unknown
    }
}

/// Classify every shift against its entity's policy.
///
/// Shifts whose entity has no policy are `Unknown`. When several policies
/// name the same entity the first one wins.
pub fn classify_shifts(
    shifts: &[ShiftRecord],
    policies: &[Policy],
    tz: UtcOffset,
) -> Vec<ShiftCompliance> {
    let mut by_entity: HashMap<&str, &Policy> = HashMap::new();
    for policy in policies {
        by_entity.entry(policy.entity_id.as_str()).or_insert(policy);
    }

    shifts
        .iter()
        .map(|shift| {
            let result = match by_entity.get(shift.entity_id.as_str()) {
                Some(policy) => classify(shift.clock_in, policy, tz),
                None => {
                    tracing::debug!(entity = %shift.entity_id, "no policy for entity");
                    ComplianceResult::unknown()
                }
            };
            ShiftCompliance {
                entity_id: shift.entity_id.clone(),
                subject_id: shift.subject_id.clone(),
                result,
            }
        })
        .collect()
}

/// Per-entity tally of [`classify_shifts`].
pub fn compliance_summary(
    shifts: &[ShiftRecord],
    policies: &[Policy],
    tz: UtcOffset,
) -> BTreeMap<String, ComplianceTally> {
    let mut summary: BTreeMap<String, ComplianceTally> = BTreeMap::new();
    for classified in classify_shifts(shifts, policies, tz) {
        summary
            .entry(classified.entity_id)
            .or_default()
            .record(&classified.result);
    }
    summary
}
