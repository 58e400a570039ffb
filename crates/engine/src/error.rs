/// Errors raised while turning textual inputs into engine values.
///
/// Derivations themselves never fail: missing or partial data degrades to a
/// neutral result. Only the parsers in [`crate::clock`] return this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A UTC offset string such as `+05:30` could not be parsed.
    #[error("invalid utc offset '{value}': {message}")]
    InvalidOffset { value: String, message: String },

    /// A calendar day was not in `YYYY-MM-DD` form.
    #[error("invalid calendar day '{value}': {message}")]
    InvalidDay { value: String, message: String },

    /// A time of day was not in `HH:MM` (or `HH:MM:SS`) form.
    #[error("invalid time of day '{value}': {message}")]
    InvalidTimeOfDay { value: String, message: String },

    /// An instant was not a valid RFC 3339 timestamp.
    #[error("invalid instant '{value}': {message}")]
    InvalidInstant { value: String, message: String },
}
