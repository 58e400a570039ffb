//! Daily density histograms, tier segmentation, and circular peak windows.
//!
//! A day is split into 96 fifteen-minute slots. Records are counted into the
//! slot their timestamp falls in (in the reference timezone), each slot is
//! tiered relative to the busiest slot, contiguous same-tier slots are merged
//! into segments, and the busiest fixed-length window is searched for on the
//! day treated as a circle (23:45 is followed by 00:00).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::UtcOffset;

use crate::clock::{slot_of, slot_range_label, SLOTS_PER_DAY};
use crate::types::TimestampedRecord;

/// Per-slot record counts for one day.
pub type SlotCounts = [u32; SLOTS_PER_DAY];

/// Two hours at 15-minute resolution.
pub const DEFAULT_WINDOW_SLOTS: usize = 8;

/// A slot is Green when `count / max >= GREEN_NUMERATOR / GREEN_DENOMINATOR`.
const GREEN_NUMERATOR: u64 = 6;
const GREEN_DENOMINATOR: u64 = 10;

// ──────────────────────────────────────────────
// Bucketing
// ──────────────────────────────────────────────

/// Slot of a record in `tz`, or `None` when it has no timestamp or the
/// timestamp cannot be viewed in `tz`.
fn record_slot(record: &TimestampedRecord, tz: UtcOffset) -> Option<usize> {
    slot_of(record.occurred_at?, tz)
}

/// Count records per slot. Records without a usable timestamp are ignored.
pub fn bucketize(records: &[TimestampedRecord], tz: UtcOffset) -> SlotCounts {
    let mut counts = [0u32; SLOTS_PER_DAY];
    let mut skipped = 0usize;
    for record in records {
        match record_slot(record, tz) {
            Some(slot) => counts[slot] += 1,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "records without usable timestamp left out of histogram");
    }
    counts
}

/// Sum record amounts per slot. Records without a usable timestamp or an
/// amount contribute nothing.
pub fn bucketize_amounts(
    records: &[TimestampedRecord],
    tz: UtcOffset,
) -> [Decimal; SLOTS_PER_DAY] {
    let mut amounts = [Decimal::ZERO; SLOTS_PER_DAY];
    for record in records {
        if let (Some(slot), Some(amount)) = (record_slot(record, tz), record.amount) {
            amounts[slot] += amount;
        }
    }
    amounts
}

// ──────────────────────────────────────────────
// Tiers and segments
// ──────────────────────────────────────────────

/// Density class of a slot relative to the day's busiest slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Red,
    Yellow,
    Green,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Red => write!(f, "red"),
            Tier::Yellow => write!(f, "yellow"),
            Tier::Green => write!(f, "green"),
        }
    }
}

/// Largest slot count, floored at 1 so it can always divide.
pub fn max_count(counts: &SlotCounts) -> u32 {
    counts.iter().copied().max().unwrap_or(0).max(1)
}

/// Tier of a slot: Red when empty, Green at 60% of `max_count` or more,
/// Yellow otherwise. `max_count` is floored at 1.
pub fn tier(count: u32, max_count: u32) -> Tier {
    if count == 0 {
        return Tier::Red;
    }
    let max = u64::from(max_count.max(1));
    if u64::from(count) * GREEN_DENOMINATOR >= max * GREEN_NUMERATOR {
        Tier::Green
    } else {
        Tier::Yellow
    }
}

/// A maximal run of same-tier slots. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub tier: Tier,
    pub start_slot: usize,
    pub end_slot: usize,
    pub total_count: u64,
}

impl Segment {
    pub fn slot_len(&self) -> usize {
        self.end_slot - self.start_slot + 1
    }

    /// Wall-clock span, e.g. `09:00-11:00`.
    pub fn label(&self) -> String {
        slot_range_label(self.start_slot, self.end_slot)
    }
}

/// Tier every slot and merge neighbours sharing a tier.
///
/// The segments partition `0..96` in order and their totals sum to the
/// total of `counts`.
pub fn merge_segments(counts: &SlotCounts) -> Vec<Segment> {
    let max = max_count(counts);
    let mut segments: Vec<Segment> = Vec::new();

    for (slot, &count) in counts.iter().enumerate() {
        let slot_tier = tier(count, max);
        match segments.last_mut() {
            Some(open) if open.tier == slot_tier => {
                open.end_slot = slot;
                open.total_count += u64::from(count);
            }
            _ => segments.push(Segment {
                tier: slot_tier,
                start_slot: slot,
                end_slot: slot,
                total_count: u64::from(count),
            }),
        }
    }

    segments
}

// ──────────────────────────────────────────────
// Peak window
// ──────────────────────────────────────────────

/// The busiest window of `window_slots` consecutive slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakWindow {
    pub start_slot: usize,
    pub window_slots: usize,
    pub sum: u64,
}

impl PeakWindow {
    /// Last slot of the window, wrapped onto `0..96`. `None` for a
    /// zero-width window.
    pub fn end_slot(&self) -> Option<usize> {
        if self.window_slots == 0 {
            return None;
        }
        Some((self.start_slot + self.window_slots - 1) % SLOTS_PER_DAY)
    }

    /// Whether the window runs past 23:45 into the next day's slots.
    pub fn wraps(&self) -> bool {
        self.start_slot + self.window_slots > SLOTS_PER_DAY
    }

    /// Wall-clock span, e.g. `12:00-14:00`. Empty for a zero-width window.
    pub fn label(&self) -> String {
        self.end_slot()
            .map(|end| slot_range_label(self.start_slot, end))
            .unwrap_or_default()
    }
}

/// Find the start slot whose circular `window_slots`-wide running sum is
/// largest. Ties go to the earliest start slot.
///
/// A zero-width window yields `{ start_slot: 0, sum: 0 }`; widths above 96
/// are clamped to the whole day.
pub fn peak_window(counts: &SlotCounts, window_slots: usize) -> PeakWindow {
    let width = window_slots.min(SLOTS_PER_DAY);
    if width == 0 {
        return PeakWindow {
            start_slot: 0,
            window_slots: 0,
            sum: 0,
        };
    }

    let at = |slot: usize| u64::from(counts[slot % SLOTS_PER_DAY]);

    let mut running: u64 = (0..width).map(at).sum();
    let mut best = PeakWindow {
        start_slot: 0,
        window_slots: width,
        sum: running,
    };

    for start in 1..SLOTS_PER_DAY {
        running = running + at(start + width - 1) - at(start - 1);
        if running > best.sum {
            best.start_slot = start;
            best.sum = running;
        }
    }

    best
}

/// Peak window per group, where the group is the value of `attribute` on
/// each record. Records lacking the attribute are skipped.
pub fn peak_windows_by(
    records: &[TimestampedRecord],
    tz: UtcOffset,
    attribute: &str,
    window_slots: usize,
) -> BTreeMap<String, PeakWindow> {
    let mut groups: BTreeMap<&str, SlotCounts> = BTreeMap::new();
    for record in records {
        let (Some(group), Some(slot)) = (record.attributes.get(attribute), record_slot(record, tz))
        else {
            continue;
        };
        groups.entry(group.as_str()).or_insert([0; SLOTS_PER_DAY])[slot] += 1;
    }

    groups
        .into_iter()
        .map(|(group, counts)| (group.to_string(), peak_window(&counts, window_slots)))
        .collect()
}

// ──────────────────────────────────────────────
// Report
// ──────────────────────────────────────────────

/// Everything the dashboard needs to draw one density strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityReport {
    pub counts: Vec<u32>,
    pub amounts: Vec<Decimal>,
    pub segments: Vec<Segment>,
    pub peak: PeakWindow,
    pub total_count: u64,
    pub total_amount: Decimal,
}

pub fn density_report(
    records: &[TimestampedRecord],
    tz: UtcOffset,
    window_slots: usize,
) -> DensityReport {
    let counts = bucketize(records, tz);
    let amounts = bucketize_amounts(records, tz);
    DensityReport {
        segments: merge_segments(&counts),
        peak: peak_window(&counts, window_slots),
        total_count: counts.iter().map(|&c| u64::from(c)).sum(),
        total_amount: amounts.iter().copied().sum(),
        counts: counts.to_vec(),
        amounts: amounts.to_vec(),
    }
}
