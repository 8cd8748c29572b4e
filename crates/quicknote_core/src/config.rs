//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables for storage location and autosave behavior.
//! - Parse host-provided JSON configuration with defaults for absent fields.
//!
//! # Invariants
//! - A validated config has a non-blank storage key and a non-zero debounce.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "quicknote.notes.v1";
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 350;

/// What happens to an uncommitted draft when another note is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// Drop the pending edit.
    #[default]
    Discard,
    /// Commit the pending edit before switching.
    Flush,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Key of the single storage entry holding the collection.
    pub storage_key: String,
    /// Quiescence window before a draft is committed.
    pub autosave_debounce_ms: u64,
    pub switch_policy: SwitchPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            switch_policy: SwitchPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    NotAnObject,
    BlankStorageKey,
    ZeroDebounce,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::NotAnObject => write!(f, "invalid config json: expected an object"),
            Self::BlankStorageKey => write!(f, "storage_key cannot be blank"),
            Self::ZeroDebounce => write!(f, "autosave_debounce_ms must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NotAnObject | Self::BlankStorageKey | Self::ZeroDebounce => None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config object. Absent fields take
    /// their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        // serde would otherwise map array elements onto fields by position.
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let config: Self = serde_json::from_value(value).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::BlankStorageKey);
        }
        if self.autosave_debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        Ok(())
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
