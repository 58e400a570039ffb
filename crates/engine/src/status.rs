//! Point-in-time status reconstruction from an append-only status log.
//!
//! A day is Active when the entity entered the day active, or when any
//! activation happened during the day (even if it was deactivated again
//! before the day ended).
//!
//! The baseline for a day is resolved in this order:
//! 1. the last event strictly before the day starts;
//! 2. with no such event, the inverse of the earliest event in the log
//!    (an entity whose first recorded change is a deactivation is taken
//!    to have been active before it);
//! 3. with an empty log, the entity's live `current_status` flag.

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::clock::{day_bounds, is_last_day};
use crate::types::{Entity, StatusAction, StatusEvent};

/// Derived status of an entity for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Active,
    Inactive,
}

impl Activity {
    pub fn from_bool(active: bool) -> Self {
        if active {
            Activity::Active
        } else {
            Activity::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        self == Activity::Active
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activity::Active => write!(f, "active"),
            Activity::Inactive => write!(f, "inactive"),
        }
    }
}

/// One row of a status calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayStatus {
    #[serde(serialize_with = "crate::clock::serialize_day")]
    pub day: Date,
    pub status: Activity,
}

/// Status of `entity` on `day`, with day boundaries taken in `tz`.
pub fn status_on_day(entity: &Entity, day: Date, tz: UtcOffset) -> Activity {
    StatusTimeline::new(entity).on_day(day, tz)
}

/// Day-by-day status for the inclusive range `from..=to`.
///
/// Returns an empty list when `from > to`.
pub fn status_calendar(entity: &Entity, from: Date, to: Date, tz: UtcOffset) -> Vec<DayStatus> {
    let timeline = StatusTimeline::new(entity);
    let mut days = Vec::new();
    let mut cursor = Some(from);
    while let Some(day) = cursor {
        if day > to {
            break;
        }
        days.push(DayStatus {
            day,
            status: timeline.on_day(day, tz),
        });
        cursor = day.next_day();
    }
    days
}

/// The most recent status change, if any. Among events sharing the latest
/// timestamp, the one appended last wins.
pub fn last_change(entity: &Entity) -> Option<&StatusEvent> {
    entity.status_log.iter().max_by_key(|e| e.occurred_at)
}

/// An entity's log sorted once, queried many times.
struct StatusTimeline<'a> {
    entity_id: &'a str,
    current_status: bool,
    /// Stable-sorted by `occurred_at`; equal timestamps keep log order.
    events: Vec<&'a StatusEvent>,
}

impl<'a> StatusTimeline<'a> {
    fn new(entity: &'a Entity) -> Self {
        let mut events: Vec<&StatusEvent> = entity.status_log.iter().collect();
        events.sort_by_key(|e| e.occurred_at);
        StatusTimeline {
            entity_id: &entity.id,
            current_status: entity.current_status,
            events,
        }
    }

    fn on_day(&self, day: Date, tz: UtcOffset) -> Activity {
        let (day_start, day_end) = day_bounds(day, tz);
        let first_in_day = self.index_before(day_start);

        if self.baseline(first_in_day) {
            return Activity::Active;
        }

        let after_day = if is_last_day(day) {
            self.index_through(day_end)
        } else {
            self.index_before(day_end)
        };
        let activated = self.events[first_in_day..after_day]
            .iter()
            .any(|e| e.action == StatusAction::Activated);
        Activity::from_bool(activated)
    }

    /// Number of events strictly before `instant`.
    fn index_before(&self, instant: OffsetDateTime) -> usize {
        self.events.partition_point(|e| e.occurred_at < instant)
    }

    /// Number of events at or before `instant`.
    fn index_through(&self, instant: OffsetDateTime) -> usize {
        self.events.partition_point(|e| e.occurred_at <= instant)
    }

    fn baseline(&self, events_before_day: usize) -> bool {
        if events_before_day > 0 {
            return self.events[events_before_day - 1].action == StatusAction::Activated;
        }
        match self.events.first() {
            Some(earliest) => {
                tracing::trace!(
                    entity = self.entity_id,
                    "no status change before day, inverting earliest event"
                );
                earliest.action == StatusAction::Deactivated
            }
            None => self.current_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    fn entity(current: bool) -> Entity {
        Entity::new("north", current)
    }

    #[test]
    fn empty_log_uses_current_status() {
        let day = date!(2024 - 05 - 01);
        assert_eq!(
            status_on_day(&entity(true), day, UtcOffset::UTC),
            Activity::Active
        );
        assert_eq!(
            status_on_day(&entity(false), day, UtcOffset::UTC),
            Activity::Inactive
        );
    }

    #[test]
    fn prior_event_sets_baseline() {
        let e = entity(false)
            .with_event(StatusAction::Activated, datetime!(2024-05-01 10:00 UTC), "a")
            .with_event(StatusAction::Deactivated, datetime!(2024-05-03 10:00 UTC), "b");
        let tz = UtcOffset::UTC;
        assert_eq!(status_on_day(&e, date!(2024 - 05 - 02), tz), Activity::Active);
        assert_eq!(status_on_day(&e, date!(2024 - 05 - 04), tz), Activity::Inactive);
    }

    #[test]
    fn deactivation_on_day_keeps_active_baseline() {
        let e = entity(false)
            .with_event(StatusAction::Activated, datetime!(2024-05-01 10:00 UTC), "a")
            .with_event(StatusAction::Deactivated, datetime!(2024-05-03 10:00 UTC), "b");
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 03), UtcOffset::UTC),
            Activity::Active
        );
    }

    #[test]
    fn any_activation_during_day_marks_active() {
        let e = entity(false)
            .with_event(StatusAction::Deactivated, datetime!(2024-05-01 08:00 UTC), "a")
            .with_event(StatusAction::Activated, datetime!(2024-05-05 09:00 UTC), "b")
            .with_event(StatusAction::Deactivated, datetime!(2024-05-05 11:00 UTC), "c");
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 05), UtcOffset::UTC),
            Activity::Active
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 06), UtcOffset::UTC),
            Activity::Inactive
        );
    }

    #[test]
    fn earliest_deactivation_infers_active_before_it() {
        let e = entity(false).with_event(
            StatusAction::Deactivated,
            datetime!(2024-05-10 12:00 UTC),
            "ops",
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 01), UtcOffset::UTC),
            Activity::Active
        );
    }

    #[test]
    fn earliest_activation_infers_inactive_before_it() {
        let e = entity(true).with_event(
            StatusAction::Activated,
            datetime!(2024-05-10 12:00 UTC),
            "ops",
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 01), UtcOffset::UTC),
            Activity::Inactive
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 10), UtcOffset::UTC),
            Activity::Active
        );
    }

    #[test]
    fn repeated_activations_are_tolerated() {
        let e = entity(true)
            .with_event(StatusAction::Activated, datetime!(2024-05-01 10:00 UTC), "a")
            .with_event(StatusAction::Activated, datetime!(2024-05-02 10:00 UTC), "b");
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 03), UtcOffset::UTC),
            Activity::Active
        );
    }

    #[test]
    fn unsorted_log_is_sorted_before_use() {
        let e = entity(false)
            .with_event(StatusAction::Deactivated, datetime!(2024-05-03 10:00 UTC), "b")
            .with_event(StatusAction::Activated, datetime!(2024-05-01 10:00 UTC), "a");
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 02), UtcOffset::UTC),
            Activity::Active
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 04), UtcOffset::UTC),
            Activity::Inactive
        );
    }

    #[test]
    fn day_boundary_depends_on_timezone() {
        // 22:00 UTC on the 1st is 01:00 on the 2nd at +03:00.
        let e = entity(false)
            .with_event(StatusAction::Deactivated, datetime!(2024-04-01 00:00 UTC), "a")
            .with_event(StatusAction::Activated, datetime!(2024-05-01 22:00 UTC), "b")
            .with_event(StatusAction::Deactivated, datetime!(2024-05-01 23:00 UTC), "c");
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 01), UtcOffset::UTC),
            Activity::Active
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 01), offset!(+3)),
            Activity::Inactive
        );
        assert_eq!(
            status_on_day(&e, date!(2024 - 05 - 02), offset!(+3)),
            Activity::Active
        );
    }

    #[test]
    fn calendar_covers_inclusive_range() {
        let e = entity(false)
            .with_event(StatusAction::Deactivated, datetime!(2024-05-01 00:00 UTC), "a")
            .with_event(StatusAction::Activated, datetime!(2024-05-03 12:00 UTC), "b");
        let days = status_calendar(
            &e,
            date!(2024 - 05 - 02),
            date!(2024 - 05 - 04),
            UtcOffset::UTC,
        );
        let statuses: Vec<Activity> = days.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![Activity::Inactive, Activity::Active, Activity::Active]
        );
        assert_eq!(days[0].day, date!(2024 - 05 - 02));
    }

    #[test]
    fn activation_at_final_instant_of_last_day_counts() {
        let (_, last_instant) = day_bounds(Date::MAX, UtcOffset::UTC);
        let e = entity(false)
            .with_event(StatusAction::Deactivated, datetime!(2024-01-01 09:00 UTC), "ops")
            .with_event(StatusAction::Activated, last_instant, "ops");
        assert_eq!(
            status_on_day(&e, Date::MAX, UtcOffset::UTC),
            Activity::Active
        );
    }

    #[test]
    fn calendar_with_reversed_range_is_empty() {
        let days = status_calendar(
            &entity(true),
            date!(2024 - 05 - 04),
            date!(2024 - 05 - 02),
            UtcOffset::UTC,
        );
        assert!(days.is_empty());
    }

    #[test]
    fn last_change_prefers_latest_then_last_appended() {
        let at = datetime!(2024-05-03 10:00 UTC);
        let e = entity(true)
            .with_event(StatusAction::Activated, datetime!(2024-05-01 10:00 UTC), "alice")
            .with_event(StatusAction::Deactivated, at, "bob")
            .with_event(StatusAction::Activated, at, "carol");
        let last = last_change(&e).unwrap();
        assert_eq!(last.actor, "carol");
        assert!(last_change(&entity(true)).is_none());
    }

    #[test]
    fn day_status_serializes_day_as_iso_string() {
        let row = DayStatus {
            day: date!(2024 - 05 - 02),
            status: Activity::Active,
        };
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "day": "2024-05-02", "status": "active" })
        );
    }
}
