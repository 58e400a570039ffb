//! Recency-weighted inference of who currently staffs each entity.
//!
//! Two sources feed the roster of an entity:
//!
//! - **Schedule**: only the most recent distinct assignment dates up to and
//!   including today are considered. A subject qualifies with one shift when
//!   two or fewer dates were selected, and needs two shifts otherwise.
//! - **Profile**: subjects in non-schedule-driven roles whose static profile
//!   lists the entity and whose status is not `inactive`.
//!
//! Schedule entries come first, profile entries are appended only for
//! subjects not already present, and the merged list is stable-sorted by role
//! priority with unknown roles last.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use time::Date;

use crate::types::{ScheduleAssignment, StaticProfile};

/// Number of distinct recent dates considered by default.
pub const DEFAULT_RECENT_DATES: usize = 4;

/// Tunables for [`active_roster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPolicy {
    /// How many of the most recent distinct dates to look at.
    pub recent_dates: usize,
    /// Roles in display order. Roles not listed sort after all listed ones.
    pub role_priority: Vec<String>,
    /// Roles that are staffed by profile declaration rather than schedule.
    pub static_roles: Vec<String>,
}

impl Default for RosterPolicy {
    fn default() -> Self {
        RosterPolicy {
            recent_dates: DEFAULT_RECENT_DATES,
            role_priority: Vec::new(),
            static_roles: Vec::new(),
        }
    }
}

impl RosterPolicy {
    fn priority_of(&self, role: Option<&str>) -> usize {
        role.and_then(|r| self.role_priority.iter().position(|p| p == r))
            .unwrap_or(self.role_priority.len())
    }

    fn is_static_role(&self, role: Option<&str>) -> bool {
        role.is_some_and(|r| self.static_roles.iter().any(|s| s == r))
    }
}

/// Why a subject is on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
    Schedule,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub subject_id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub source: RosterSource,
    /// Selected recent dates the subject was scheduled on. Zero for
    /// profile entries.
    pub shift_count: usize,
}

/// Roster per entity id.
pub type Roster = BTreeMap<String, Vec<RosterEntry>>;

/// Shift threshold for a given number of selected dates.
pub fn min_shifts(selected_dates: usize) -> usize {
    if selected_dates <= 2 {
        1
    } else {
        2
    }
}

/// Build the roster of every entity named by an assignment or a profile.
///
/// Entities with nobody qualifying map to an empty list.
pub fn active_roster(
    assignments: &[ScheduleAssignment],
    profiles: &[StaticProfile],
    today: Date,
    policy: &RosterPolicy,
) -> Roster {
    let mut profiles_by_subject: HashMap<&str, &StaticProfile> = HashMap::new();
    for profile in profiles {
        profiles_by_subject
            .entry(profile.subject_id.as_str())
            .or_insert(profile);
    }

    let mut by_entity: BTreeMap<&str, Vec<&ScheduleAssignment>> = BTreeMap::new();
    for assignment in assignments {
        by_entity
            .entry(assignment.entity_id.as_str())
            .or_default()
            .push(assignment);
    }
    for profile in profiles {
        for entity_id in &profile.entity_ids {
            by_entity.entry(entity_id.as_str()).or_default();
        }
    }

    by_entity
        .into_iter()
        .map(|(entity_id, entity_assignments)| {
            let roster = entity_roster(
                entity_id,
                &entity_assignments,
                profiles,
                &profiles_by_subject,
                today,
                policy,
            );
            (entity_id.to_string(), roster)
        })
        .collect()
}

fn entity_roster(
    entity_id: &str,
    assignments: &[&ScheduleAssignment],
    profiles: &[StaticProfile],
    profiles_by_subject: &HashMap<&str, &StaticProfile>,
    today: Date,
    policy: &RosterPolicy,
) -> Vec<RosterEntry> {
    let past: Vec<&ScheduleAssignment> = assignments
        .iter()
        .copied()
        .filter(|a| a.date <= today)
        .collect();

    let distinct: BTreeSet<Date> = past.iter().map(|a| a.date).collect();
    let selected: HashSet<Date> = distinct
        .iter()
        .rev()
        .take(policy.recent_dates)
        .copied()
        .collect();
    let threshold = min_shifts(selected.len());

    // First-seen order of subjects, and the selected dates each worked.
    let mut order: Vec<&str> = Vec::new();
    let mut worked: HashMap<&str, HashSet<Date>> = HashMap::new();
    for assignment in past.iter().filter(|a| selected.contains(&a.date)) {
        let subject = assignment.subject_id.as_str();
        worked
            .entry(subject)
            .or_insert_with(|| {
                order.push(subject);
                HashSet::new()
            })
            .insert(assignment.date);
    }

    let mut included: HashSet<&str> = HashSet::new();
    let mut entries: Vec<RosterEntry> = Vec::new();

    for subject in order {
        let shift_count = worked.get(subject).map_or(0, HashSet::len);
        if shift_count < threshold {
            continue;
        }
        let profile = profiles_by_subject.get(subject).copied();
        included.insert(subject);
        entries.push(RosterEntry {
            subject_id: subject.to_string(),
            name: profile.and_then(|p| p.name.clone()),
            role: profile.and_then(|p| p.role.clone()),
            source: RosterSource::Schedule,
            shift_count,
        });
    }

    for profile in profiles {
        if !profile.entity_ids.iter().any(|e| e == entity_id)
            || profile.is_inactive()
            || !policy.is_static_role(profile.role.as_deref())
        {
            continue;
        }
        if !included.insert(profile.subject_id.as_str()) {
            continue;
        }
        entries.push(RosterEntry {
            subject_id: profile.subject_id.clone(),
            name: profile.name.clone(),
            role: profile.role.clone(),
            source: RosterSource::Profile,
            shift_count: 0,
        });
    }

    entries.sort_by_key(|e| policy.priority_of(e.role.as_deref()));

    tracing::debug!(
        entity = entity_id,
        selected_dates = selected.len(),
        min_shifts = threshold,
        staffed = entries.len(),
        "roster inferred"
    );
    entries
}
