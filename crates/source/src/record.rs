use std::collections::BTreeMap;

use cadence_engine::clock::{parse_day, parse_instant, parse_time_of_day};
use cadence_engine::{
    Entity, Policy, ScheduleAssignment, ShiftRecord, StaticProfile, StatusAction, StatusEvent,
    TimestampedRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The whole record store exported as one JSON document.
///
/// Every collection is optional so partial exports load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub shifts: Vec<ClockInRecord>,
    #[serde(default)]
    pub policies: Vec<PolicyRecord>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
}

/// An entity and its status log as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(default)]
    pub current_status: bool,
    #[serde(default)]
    pub status_log: Vec<StatusEventRecord>,
}

/// One status change. `action` is `activated` or `deactivated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEventRecord {
    pub action: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub occurred_at: Option<String>,
    #[serde(default)]
    pub actor: String,
}

/// A payment or any other timestamped record fed to the density bucketer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    /// ISO 8601 / RFC 3339 timestamp string.
    pub occurred_at: Option<String>,
    pub subject_id: String,
    /// Decimal amount, as a JSON string or number.
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A shift clock-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockInRecord {
    /// ISO 8601 / RFC 3339 timestamp string.
    pub clock_in: Option<String>,
    pub entity_id: String,
    pub subject_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub entity_id: String,
    /// Wall-clock `HH:MM`.
    pub nominal_start_of_day: Option<String>,
    #[serde(default)]
    pub grace_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub subject_id: String,
    pub entity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub subject_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub entity_ids: Vec<String>,
}

// ──────────────────────────────────────────────
// Conversion into engine types
// ──────────────────────────────────────────────
//
// A bad field never fails the whole snapshot. Optional instants degrade to
// `None`; records that cannot exist without their timestamp or day are
// dropped. Both cases are logged.

fn lenient_instant(field: &str, raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw?;
    match parse_instant(raw) {
        Ok(at) => Some(at),
        Err(e) => {
            tracing::warn!(field, error = %e, "malformed timestamp treated as missing");
            None
        }
    }
}

fn lenient_amount(raw: Option<&serde_json::Value>) -> Option<Decimal> {
    let parsed = match raw? {
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
        serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        serde_json::Value::Null => return None,
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(amount = ?raw, "malformed amount treated as missing");
    }
    parsed
}

impl EntityRecord {
    pub fn into_entity(self) -> Entity {
        let entity_id = self.id;
        let status_log = self
            .status_log
            .into_iter()
            .filter_map(|event| event.into_event(&entity_id))
            .collect();
        Entity {
            id: entity_id,
            current_status: self.current_status,
            status_log,
        }
    }
}

impl StatusEventRecord {
    fn into_event(self, entity_id: &str) -> Option<StatusEvent> {
        let action = match self.action.trim().to_ascii_lowercase().as_str() {
            "activated" => StatusAction::Activated,
            "deactivated" => StatusAction::Deactivated,
            other => {
                tracing::warn!(entity = entity_id, action = other, "unknown status action dropped");
                return None;
            }
        };
        let occurred_at = lenient_instant("status_log.occurred_at", self.occurred_at.as_deref());
        let Some(occurred_at) = occurred_at else {
            tracing::warn!(entity = entity_id, "status event without usable timestamp dropped");
            return None;
        };
        Some(StatusEvent {
            action,
            occurred_at,
            actor: self.actor,
        })
    }
}

impl SaleRecord {
    pub fn into_record(self) -> TimestampedRecord {
        TimestampedRecord {
            occurred_at: lenient_instant("sales.occurred_at", self.occurred_at.as_deref()),
            amount: lenient_amount(self.amount.as_ref()),
            subject_id: self.subject_id,
            attributes: self.attributes,
        }
    }
}

impl ClockInRecord {
    pub fn into_shift(self) -> ShiftRecord {
        ShiftRecord {
            clock_in: lenient_instant("shifts.clock_in", self.clock_in.as_deref()),
            entity_id: self.entity_id,
            subject_id: self.subject_id,
        }
    }
}

impl PolicyRecord {
    pub fn into_policy(self) -> Policy {
        let nominal_start_of_day = self.nominal_start_of_day.as_deref().and_then(|raw| {
            match parse_time_of_day(raw) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(entity = %self.entity_id, error = %e, "malformed nominal start");
                    None
                }
            }
        });
        Policy {
            entity_id: self.entity_id,
            nominal_start_of_day,
            grace_minutes: self.grace_minutes,
        }
    }
}

impl AssignmentRecord {
    pub fn into_assignment(self) -> Option<ScheduleAssignment> {
        match parse_day(&self.date) {
            Ok(date) => Some(ScheduleAssignment {
                date,
                subject_id: self.subject_id,
                entity_id: self.entity_id,
            }),
            Err(e) => {
                tracing::warn!(
                    entity = %self.entity_id,
                    subject = %self.subject_id,
                    error = %e,
                    "assignment with malformed date dropped"
                );
                None
            }
        }
    }
}

impl ProfileRecord {
    pub fn into_profile(self) -> StaticProfile {
        StaticProfile {
            subject_id: self.subject_id,
            name: self.name,
            role: self.role,
            status: self.status,
            entity_ids: self.entity_ids,
        }
    }
}
