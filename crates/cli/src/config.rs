//! `cadence.toml` settings.
//!
//! Every key is optional. A missing file section falls back to the engine
//! defaults, and command-line flags override whatever the file says.
//!
//! ```toml
//! reference_offset = "+03:00"
//!
//! [density]
//! window_slots = 8
//!
//! [roster]
//! recent_dates = 4
//! role_priority = ["supervisor", "cashier"]
//! static_roles = ["supervisor"]
//! ```

use std::path::Path;

use cadence_engine::clock::parse_offset;
use cadence_engine::roster::DEFAULT_RECENT_DATES;
use cadence_engine::{EngineError, RosterPolicy, DEFAULT_WINDOW_SLOTS};
use serde::Deserialize;
use time::UtcOffset;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Fixed UTC offset all day boundaries are taken in.
    pub reference_offset: String,
    pub density: DensitySettings,
    pub roster: RosterSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DensitySettings {
    pub window_slots: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RosterSettings {
    pub recent_dates: usize,
    pub role_priority: Vec<String>,
    pub static_roles: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            reference_offset: "Z".to_string(),
            density: DensitySettings::default(),
            roster: RosterSettings::default(),
        }
    }
}

impl Default for DensitySettings {
    fn default() -> Self {
        DensitySettings {
            window_slots: DEFAULT_WINDOW_SLOTS,
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        RosterSettings {
            recent_dates: DEFAULT_RECENT_DATES,
            role_priority: Vec::new(),
            static_roles: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Settings::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        // Surface a bad offset at load time rather than mid-command.
        settings.offset()?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    fn from_toml(content: &str) -> Result<Settings, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn offset(&self) -> Result<UtcOffset, ConfigError> {
        Ok(parse_offset(&self.reference_offset)?)
    }

    pub fn roster_policy(&self) -> RosterPolicy {
        RosterPolicy {
            recent_dates: self.roster.recent_dates,
            role_priority: self.roster.role_priority.clone(),
            static_roles: self.roster.static_roles.clone(),
        }
    }
}
