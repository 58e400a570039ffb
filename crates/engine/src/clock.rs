//! Day-boundary and time-of-day helpers shared by every derivation.
//!
//! The reference timezone is always an explicit `UtcOffset` argument; nothing
//! in this module reads the host's local zone.

use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::error::EngineError;

/// Width of one density slot.
pub const SLOT_MINUTES: u32 = 15;

/// Number of slots in a 24-hour day.
pub const SLOTS_PER_DAY: usize = (24 * 60 / SLOT_MINUTES) as usize;

/// Half-open `[start, end)` bounds of `day` in `tz`.
///
/// `Date::MAX` has no following midnight, so its `end` is the day's last
/// nanosecond and must be treated as inclusive; see [`is_last_day`].
pub fn day_bounds(day: Date, tz: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    let start = day.midnight().assume_offset(tz);
    let end = match day.next_day() {
        Some(next) => next.midnight().assume_offset(tz),
        None => day.with_time(time!(23:59:59.999_999_999)).assume_offset(tz),
    };
    (start, end)
}

/// Whether `day` is the last representable calendar day.
pub fn is_last_day(day: Date) -> bool {
    day.next_day().is_none()
}

/// Minutes elapsed since local midnight, with the instant viewed in `tz`.
///
/// `None` when the instant cannot be expressed in `tz` because the shifted
/// date falls outside the representable range.
pub fn minutes_since_midnight(instant: OffsetDateTime, tz: UtcOffset) -> Option<u32> {
    let t = instant.checked_to_offset(tz)?.time();
    Some(u32::from(t.hour()) * 60 + u32::from(t.minute()))
}

/// Minutes since midnight of a wall-clock time.
pub fn time_minutes(t: Time) -> u32 {
    u32::from(t.hour()) * 60 + u32::from(t.minute())
}

/// Index of the 15-minute slot the instant falls into, in `tz`.
pub fn slot_of(instant: OffsetDateTime, tz: UtcOffset) -> Option<usize> {
    minutes_since_midnight(instant, tz).map(|m| (m / SLOT_MINUTES) as usize)
}

/// The calendar day `now` falls on in `tz`.
pub fn today_in(now: OffsetDateTime, tz: UtcOffset) -> Date {
    now.checked_to_offset(tz).map_or(now.date(), |local| local.date())
}

/// `HH:MM` at the start of `slot`. Slot 96 renders as `24:00`.
pub fn slot_label(slot: usize) -> String {
    let minutes = slot as u32 * SLOT_MINUTES;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// `HH:MM-HH:MM` covering the inclusive slot range `start..=end`.
pub fn slot_range_label(start: usize, end: usize) -> String {
    format!("{}-{}", slot_label(start), slot_label(end + 1))
}

// ──────────────────────────────────────────────
// Parsers
// ──────────────────────────────────────────────

/// Parse `Z`, `UTC`, or a signed `+HH:MM` / `-HH:MM` offset.
pub fn parse_offset(s: &str) -> Result<UtcOffset, EngineError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|e| EngineError::InvalidOffset {
        value: s.to_string(),
        message: e.to_string(),
    })
}

/// Parse an ISO 8601 calendar day (`YYYY-MM-DD`).
pub fn parse_day(s: &str) -> Result<Date, EngineError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        EngineError::InvalidDay {
            value: s.to_string(),
            message: e.to_string(),
        }
    })
}

/// Parse a wall-clock time as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Result<Time, EngineError> {
    let trimmed = s.trim();
    Time::parse(trimmed, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(trimmed, format_description!("[hour]:[minute]")))
        .map_err(|e| EngineError::InvalidTimeOfDay {
            value: s.to_string(),
            message: e.to_string(),
        })
}

/// Parse an RFC 3339 instant.
pub fn parse_instant(s: &str) -> Result<OffsetDateTime, EngineError> {
    OffsetDateTime::parse(s.trim(), &Rfc3339).map_err(|e| EngineError::InvalidInstant {
        value: s.to_string(),
        message: e.to_string(),
    })
}

/// Format a calendar day as `YYYY-MM-DD`.
pub fn format_day(day: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}

pub(crate) fn serialize_day<S>(day: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_day(*day))
}
