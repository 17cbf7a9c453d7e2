//! Reactor configuration and named settings.
//!
//! [`Config`] holds the timing and logging knobs of a
//! [`Reactor`](crate::Reactor). It deserializes from JSON with every field
//! optional, so a partial file only overrides what it names.
//!
//! # Example
//!
//! ```ignore
//! use dom_reactor::Config;
//!
//! let config = Config::new()
//!     .with_debounce_ms(30)
//!     .with_prevent_default(["CtrlEnter", "Backquote"])
//!     .with_setting("reviewer", true);
//!
//! config.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::events::{DEFAULT_PREVENTED, KeyChord};
use crate::logging::{DEFAULT_MAX_ENTRIES, DEFAULT_MAX_ENTRY_LEN};

// ============================================================================
// Constants
// ============================================================================

/// Debounce window of reactions and touches.
pub const DEFAULT_DEBOUNCE_MS: u64 = 15;

/// Delay between retry attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 15;

/// Attempts made by retrying helpers.
pub const DEFAULT_RETRIES: u32 = 20;

/// Delay before a touch dispatches its events.
pub const DEFAULT_TOUCH_DELAY_MS: u64 = 15;

// ============================================================================
// Setting
// ============================================================================

/// A named setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting name.
    pub name: String,
    /// Setting value.
    pub value: Value,
}

// ============================================================================
// Config
// ============================================================================

/// Reactor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Debounce window of reactions and touches, in ms.
    pub debounce_ms: u64,

    /// Delay between retry attempts, in ms.
    pub retry_delay_ms: u64,

    /// Attempts made by retrying helpers.
    pub retries: u32,

    /// Delay before a touch dispatches its events, in ms.
    pub touch_delay_ms: u64,

    /// Chords whose browser default is cancelled.
    pub prevent_default: Vec<String>,

    /// Saved log entries kept before cutting down.
    pub log_max_entries: usize,

    /// Characters kept per log entry.
    pub log_entry_max_len: usize,

    /// Named settings exposed to flows.
    pub settings: Vec<Setting>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            retries: DEFAULT_RETRIES,
            touch_delay_ms: DEFAULT_TOUCH_DELAY_MS,
            prevent_default: DEFAULT_PREVENTED.iter().map(ToString::to_string).collect(),
            log_max_entries: DEFAULT_MAX_ENTRIES,
            log_entry_max_len: DEFAULT_MAX_ENTRY_LEN,
            settings: Vec::new(),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Config {
    /// Creates a configuration with default values.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if `json` is malformed
    /// - [`Error::Config`] if a value is out of range
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Json`] if the file is malformed
    /// - [`Error::Config`] if a value is out of range
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl Config {
    /// Sets the debounce window.
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Sets the retry delay.
    #[inline]
    #[must_use]
    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Sets the number of retry attempts.
    #[inline]
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the touch delay.
    #[inline]
    #[must_use]
    pub fn with_touch_delay_ms(mut self, ms: u64) -> Self {
        self.touch_delay_ms = ms;
        self
    }

    /// Replaces the prevented chords.
    #[inline]
    #[must_use]
    pub fn with_prevent_default(mut self, chords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.prevent_default = chords.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the logbook limits.
    #[inline]
    #[must_use]
    pub fn with_log_limits(mut self, max_entries: usize, max_entry_len: usize) -> Self {
        self.log_max_entries = max_entries;
        self.log_entry_max_len = max_entry_len;
        self
    }

    /// Adds or replaces a named setting.
    #[must_use]
    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.settings.iter_mut().find(|s| s.name == name) {
            Some(setting) => setting.value = value,
            None => self.settings.push(Setting { name, value }),
        }
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.retries == 0 {
            return Err(Error::config("retries must be at least 1"));
        }
        if self.log_max_entries == 0 {
            return Err(Error::config("logMaxEntries must be at least 1"));
        }
        if self.log_entry_max_len < 4 {
            return Err(Error::config("logEntryMaxLen must be at least 4"));
        }
        self.prevent_default_chords()?;
        Ok(())
    }

    /// Returns the parsed prevented chords.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a chord that does not parse.
    pub fn prevent_default_chords(&self) -> Result<FxHashSet<KeyChord>> {
        self.prevent_default
            .iter()
            .map(|s| {
                s.parse::<KeyChord>()
                    .map_err(|e| Error::config(format!("preventDefault entry '{s}': {e}")))
            })
            .collect()
    }

    /// Debounce window.
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Retry delay.
    #[inline]
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Touch delay.
    #[inline]
    #[must_use]
    pub fn touch_delay(&self) -> Duration {
        Duration::from_millis(self.touch_delay_ms)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Named settings lookup used by flows.
pub trait Settings: Send + Sync {
    /// Returns the value of `name`, if set.
    fn get(&self, name: &str) -> Option<Value>;

    /// Changes an existing setting. Returns `false` if `name` is unknown.
    fn set(&self, name: &str, value: Value) -> bool;
}

/// In-memory settings seeded from [`Config::settings`].
#[derive(Default)]
pub struct SettingStore {
    settings: RwLock<Vec<Setting>>,
}

impl fmt::Debug for SettingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.settings.read().iter().map(|s| &s.name))
            .finish()
    }
}

impl SettingStore {
    /// Creates a store holding `settings`.
    #[must_use]
    pub fn new(settings: Vec<Setting>) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl Settings for SettingStore {
    fn get(&self, name: &str) -> Option<Value> {
        self.settings
            .read()
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.clone())
    }

    fn set(&self, name: &str, value: Value) -> bool {
        match self.settings.write().iter_mut().find(|s| s.name == name) {
            Some(setting) => {
                setting.value = value;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
