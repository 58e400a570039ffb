//! Cadence temporal derivation engine -- reconstructs derived state from
//! raw, append-only, timestamped records.
//!
//! Every function here is pure: it takes already-fetched records plus an
//! explicit reference timezone and returns a freshly computed value object.
//! Nothing is cached or persisted, so calls can run in parallel across
//! entities and be repeated on every query.
//!
//! - [`status`]: was an entity active on a given day
//! - [`compliance`]: was a clock-in on time against a policy
//! - [`density`]: when do records cluster during the day
//! - [`roster`]: who currently staffs each entity

pub mod clock;
pub mod compliance;
pub mod density;
pub mod error;
pub mod roster;
pub mod status;
pub mod types;

pub use compliance::{
    classify, classify_shifts, compliance_summary, ComplianceResult, ComplianceStatus,
    ComplianceTally, LateBy, ShiftCompliance,
};
pub use density::{
    bucketize, bucketize_amounts, density_report, merge_segments, peak_window, peak_windows_by,
    tier, DensityReport, PeakWindow, Segment, SlotCounts, Tier, DEFAULT_WINDOW_SLOTS,
};
pub use error::EngineError;
pub use roster::{active_roster, Roster, RosterEntry, RosterPolicy, RosterSource};
pub use status::{last_change, status_calendar, status_on_day, Activity, DayStatus};
pub use types::{
    Entity, Policy, ScheduleAssignment, ShiftRecord, StaticProfile, StatusAction, StatusEvent,
    TimestampedRecord,
};
