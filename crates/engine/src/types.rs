//! Input record types consumed by the derivation engine.
//!
//! All of these are read-only snapshots handed over by the record store.
//! The engine never mutates them and never keeps them past a single call.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime, Time};

// ──────────────────────────────────────────────
// Status log
// ──────────────────────────────────────────────

/// Direction of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Activated,
    Deactivated,
}

/// A single entry of an entity's append-only status log.
///
/// Consecutive entries with the same action are legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub action: StatusAction,
    pub occurred_at: OffsetDateTime,
    /// Who made the change (user id or display name).
    pub actor: String,
}

/// A monitored object, e.g. an operating region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    /// Live, authoritative flag.
    pub current_status: bool,
    /// Historical log; may be empty for freshly created entities.
    pub status_log: Vec<StatusEvent>,
}

impl Entity {
    pub fn new(id: impl Into<String>, current_status: bool) -> Self {
        Entity {
            id: id.into(),
            current_status,
            status_log: Vec::new(),
        }
    }

    /// Append an event, builder style.
    pub fn with_event(
        mut self,
        action: StatusAction,
        occurred_at: OffsetDateTime,
        actor: impl Into<String>,
    ) -> Self {
        self.status_log.push(StatusEvent {
            action,
            occurred_at,
            actor: actor.into(),
        });
        self
    }
}

// ──────────────────────────────────────────────
// Timestamped records (payments, clock-ins)
// ──────────────────────────────────────────────

/// Uniform shape fed to the density bucketer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedRecord {
    /// `None` when the source timestamp was missing or malformed.
    pub occurred_at: Option<OffsetDateTime>,
    pub subject_id: String,
    pub amount: Option<Decimal>,
    /// Free-form attributes, e.g. `region`.
    pub attributes: BTreeMap<String, String>,
}

impl TimestampedRecord {
    pub fn at(occurred_at: OffsetDateTime, subject_id: impl Into<String>) -> Self {
        TimestampedRecord {
            occurred_at: Some(occurred_at),
            subject_id: subject_id.into(),
            amount: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl From<&ShiftRecord> for TimestampedRecord {
    /// A clock-in as a density record, tagged with its `entity_id`.
    fn from(shift: &ShiftRecord) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("entity_id".to_string(), shift.entity_id.clone());
        TimestampedRecord {
            occurred_at: shift.clock_in,
            subject_id: shift.subject_id.clone(),
            amount: None,
            attributes,
        }
    }
}

// ──────────────────────────────────────────────
// Scheduling and shifts
// ──────────────────────────────────────────────

/// A day-granularity schedule fact. One subject may hold several per day,
/// one per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAssignment {
    pub date: Date,
    pub subject_id: String,
    pub entity_id: String,
}

/// A clock-in event for a shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRecord {
    pub clock_in: Option<OffsetDateTime>,
    pub entity_id: String,
    pub subject_id: String,
}

/// Punctuality policy of an entity. Assumed to describe a single-day shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub entity_id: String,
    pub nominal_start_of_day: Option<Time>,
    pub grace_minutes: u32,
}

/// Static profile of a person, as declared by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticProfile {
    pub subject_id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    /// Free-form status string; `inactive` (any case) excludes the profile.
    pub status: Option<String>,
    pub entity_ids: Vec<String>,
}

impl StaticProfile {
    pub fn is_inactive(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("inactive"))
    }
}
