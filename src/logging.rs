//! Leveled logbook and GUI updates.
//!
//! Every entry goes through [`tracing`]; [`Logbook`] additionally keeps a
//! bounded history of saved entries and forwards toasts to a [`GuiSink`].
//!
//! | Level | Color | Used for |
//! |-------|-------|----------|
//! | [`LogLevel::Log`] | black | Plain messages |
//! | [`LogLevel::Notice`] | DodgerBlue | Things a user should notice |
//! | [`LogLevel::Warn`] | OrangeRed | Failed reactions and other problems |
//! | [`LogLevel::Ok`] | LimeGreen | Successful checks |
//! | [`LogLevel::Low`] | Gainsboro | No-op writes and other noise |
//! | [`LogLevel::ChangeValue`] | LightPink | Value changes through proxies |
//! | [`LogLevel::Config`] | MediumOrchid | Configuration changes |
//! | [`LogLevel::Counter`] | DarkCyan | Counter resets |
//! | [`LogLevel::Submit`] | DodgerBlue | Submitted tasks |
//! | [`LogLevel::Skip`] | DeepSkyBlue | Skipped tasks |

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom::{Document, NativeEvent, WeakNode};
use crate::error::Result;
use crate::util::counter::CounterEntry;

// ============================================================================
// Constants
// ============================================================================

/// Saved entries kept before the logbook is cut down.
pub const DEFAULT_MAX_ENTRIES: usize = 5000;

/// Characters kept per entry.
pub const DEFAULT_MAX_ENTRY_LEN: usize = 600;

/// Entries per page.
pub const PAGE_SIZE: usize = 25;

/// Event type GUI updates are dispatched under.
pub const GUI_UPDATE_EVENT: &str = "guiUpdate";

// ============================================================================
// LogLevel
// ============================================================================

/// Kind of log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    /// Plain message.
    Log,
    /// Something to notice.
    Notice,
    /// A problem.
    Warn,
    /// A passed check.
    Ok,
    /// Noise.
    Low,
    /// A value written through a proxy.
    ChangeValue,
    /// Configuration.
    Config,
    /// Counter bookkeeping.
    Counter,
    /// Submitted task.
    Submit,
    /// Skipped task.
    Skip,
}

impl LogLevel {
    /// Display color of the level.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Log => "black",
            Self::Notice | Self::Submit => "DodgerBlue",
            Self::Warn => "OrangeRed",
            Self::Ok => "LimeGreen",
            Self::Low => "Gainsboro",
            Self::ChangeValue => "LightPink",
            Self::Config => "MediumOrchid",
            Self::Counter => "DarkCyan",
            Self::Skip => "DeepSkyBlue",
        }
    }

    /// Name of the level as stored, e.g. `changeValue`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Notice => "notice",
            Self::Warn => "warn",
            Self::Ok => "ok",
            Self::Low => "low",
            Self::ChangeValue => "changeValue",
            Self::Config => "config",
            Self::Counter => "counter",
            Self::Submit => "submit",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// LogOptions
// ============================================================================

/// Where an entry goes.
///
/// The default prints, saves and toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// Emit at debug verbosity.
    pub debug: bool,
    /// Emit at info verbosity.
    pub print: bool,
    /// Keep in the logbook.
    pub save: bool,
    /// Show as a toast.
    pub toast: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            debug: false,
            print: true,
            save: true,
            toast: true,
        }
    }
}

impl LogOptions {
    /// Debug output only.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            debug: true,
            print: false,
            save: false,
            toast: false,
        }
    }

    /// Printed and saved, no toast.
    #[must_use]
    pub const fn saved() -> Self {
        Self {
            debug: false,
            print: true,
            save: true,
            toast: false,
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

/// Sink for leveled log entries.
pub trait Logger: Send + Sync {
    /// Records one entry.
    fn log(&self, level: LogLevel, payload: &str, options: LogOptions);
}

// ============================================================================
// GUI
// ============================================================================

/// State update for the task GUI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuiUpdate {
    /// Short-lived message.
    Toast {
        /// Message text.
        message: String,
        /// Level of the originating entry.
        level: LogLevel,
    },
    /// Full counter state.
    Counters(Vec<CounterEntry>),
}

/// Receiver of GUI updates.
pub trait GuiSink: Send + Sync {
    /// Delivers one update.
    fn update(&self, update: GuiUpdate);
}

/// Delivers GUI updates to the page as `guiUpdate` custom events on the
/// document node.
///
/// Holds the document weakly; updates after the page is gone are dropped.
#[derive(Debug, Clone)]
pub struct PageGui {
    root: WeakNode,
}

impl PageGui {
    /// Creates a sink for `document`.
    #[must_use]
    pub fn new(document: &Document) -> Self {
        Self {
            root: document.root().downgrade(),
        }
    }
}

impl GuiSink for PageGui {
    fn update(&self, update: GuiUpdate) {
        let Some(root) = self.root.upgrade() else {
            return;
        };
        match serde_json::to_value(&update) {
            Ok(detail) => {
                root.dispatch_event(NativeEvent::custom(GUI_UPDATE_EVENT, detail));
            }
            Err(e) => warn!(error = %e, "GUI update not serializable"),
        }
    }
}

// ============================================================================
// LogEntry
// ============================================================================

/// A saved entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch.
    pub time: u64,
    /// Entry level.
    pub level: LogLevel,
    /// Truncated payload.
    pub message: String,
}

/// Filter for [`Logbook::entries_filtered`].
///
/// Pages count backwards from the newest entry.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Only entries after this time (ms).
    pub after: Option<u64>,
    /// Only entries before this time (ms).
    pub before: Option<u64>,
    /// Only entries whose message matches this pattern.
    pub contains: Option<String>,
    /// Only entries of this level.
    pub level: Option<LogLevel>,
    /// Leave out entries of this level.
    pub exclude_level: Option<LogLevel>,
    /// Entries per page, [`PAGE_SIZE`] if unset.
    pub items: Option<usize>,
    /// Page number, 0 is the newest.
    pub page: usize,
}

// ============================================================================
// Logbook
// ============================================================================

/// Bounded in-memory logbook.
pub struct Logbook {
    entries: Mutex<VecDeque<LogEntry>>,
    max_entries: usize,
    max_entry_len: usize,
    gui: Option<Arc<dyn GuiSink>>,
}

impl fmt::Debug for Logbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logbook")
            .field("entries", &self.len())
            .field("max_entries", &self.max_entries)
            .field("max_entry_len", &self.max_entry_len)
            .finish_non_exhaustive()
    }
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_ENTRY_LEN)
    }
}

impl Logbook {
    /// Creates a logbook with the given limits.
    #[must_use]
    pub fn new(max_entries: usize, max_entry_len: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
            max_entry_len: max_entry_len.max(4),
            gui: None,
        }
    }

    /// Forwards toasts to `gui`.
    #[must_use]
    pub fn with_gui(mut self, gui: Arc<dyn GuiSink>) -> Self {
        self.gui = Some(gui);
        self
    }

    /// Returns the number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing was saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns every saved entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Returns the saved entries of `level`, oldest first.
    #[must_use]
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Returns one page of entries matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Regex`](crate::Error::Regex) if `filter.contains` is
    /// not a valid pattern.
    pub fn entries_filtered(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let pattern = filter.contains.as_deref().map(Regex::new).transpose()?;
        let matching: Vec<LogEntry> = self
            .entries
            .lock()
            .iter()
            .filter(|e| filter.after.is_none_or(|t| e.time > t))
            .filter(|e| filter.before.is_none_or(|t| e.time < t))
            .filter(|e| filter.level.is_none_or(|l| e.level == l))
            .filter(|e| filter.exclude_level.is_none_or(|l| e.level != l))
            .filter(|e| pattern.as_ref().is_none_or(|p| p.is_match(&e.message)))
            .cloned()
            .collect();

        let size = filter.items.unwrap_or(PAGE_SIZE);
        let len = matching.len();
        let end = len.saturating_sub(size * filter.page);
        let start = end.saturating_sub(size);
        Ok(matching[start..end].to_vec())
    }

    /// Drops every saved entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn truncate(&self, payload: &str) -> String {
        if payload.chars().count() <= self.max_entry_len {
            return payload.to_string();
        }
        let kept: String = payload.chars().take(self.max_entry_len - 3).collect();
        format!("{kept}...")
    }

    fn save(&self, level: LogLevel, message: String) {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        let mut entries = self.entries.lock();
        entries.push_back(LogEntry {
            time,
            level,
            message,
        });
        if entries.len() > self.max_entries {
            let keep = self.max_entries * 4 / 5;
            let excess = entries.len() - keep;
            entries.drain(..excess);
        }
    }
}

impl Logger for Logbook {
    fn log(&self, level: LogLevel, payload: &str, options: LogOptions) {
        let message = self.truncate(payload);
        if options.debug {
            debug!(level = %level, "{message}");
        } else if options.print {
            info!(level = %level, "{message}");
        }
        if options.toast
            && let Some(gui) = &self.gui
        {
            gui.update(GuiUpdate::Toast {
                message: message.clone(),
                level,
            });
        }
        if options.save {
            self.save(level, message);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_long_entries() {
        let logbook = Logbook::new(10, 10);
        logbook.log(LogLevel::Log, "abcdefghijklmnop", LogOptions::saved());
        assert_eq!(logbook.entries()[0].message, "abcdefg...");
    }

    #[test]
    fn test_quiet_is_not_saved() {
        let logbook = Logbook::default();
        logbook.log(LogLevel::Low, "nothing", LogOptions::quiet());
        assert!(logbook.is_empty());
    }

    #[test]
    fn test_cut_down_when_full() {
        let logbook = Logbook::new(10, 100);
        for i in 0..11 {
            logbook.log(LogLevel::Log, &i.to_string(), LogOptions::saved());
        }
        let entries = logbook.entries();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].message, "3");
        assert_eq!(entries[7].message, "10");
    }

    #[test]
    fn test_paging_counts_from_newest() {
        let logbook = Logbook::default();
        for i in 0..30 {
            logbook.log(LogLevel::Log, &format!("entry {i}"), LogOptions::saved());
        }
        let first = logbook.entries_filtered(&LogFilter::default()).unwrap();
        assert_eq!(first.len(), PAGE_SIZE);
        assert_eq!(first.last().unwrap().message, "entry 29");

        let second = logbook
            .entries_filtered(&LogFilter {
                page: 1,
                ..LogFilter::default()
            })
            .unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].message, "entry 0");
    }

    #[test]
    fn test_filter_by_level_and_pattern() {
        let logbook = Logbook::default();
        logbook.log(LogLevel::Warn, "Reaction failed", LogOptions::saved());
        logbook.log(LogLevel::Ok, "Checked 3 fields", LogOptions::saved());
        logbook.log(LogLevel::Warn, "Timeout", LogOptions::saved());

        let filter = LogFilter {
            level: Some(LogLevel::Warn),
            contains: Some("^Re".into()),
            ..LogFilter::default()
        };
        let found = logbook.entries_filtered(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Reaction failed");

        let bad = LogFilter {
            contains: Some("(".into()),
            ..LogFilter::default()
        };
        assert!(logbook.entries_filtered(&bad).is_err());
    }

    #[test]
    fn test_toast_reaches_document() {
        let doc = Document::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        doc.add_event_listener(
            GUI_UPDATE_EVENT,
            Arc::new(move |e: &mut NativeEvent| {
                sink.lock().push(e.detail().cloned());
            }),
        );

        let logbook = Logbook::default().with_gui(Arc::new(PageGui::new(&doc)));
        logbook.log(LogLevel::Notice, "Hello", LogOptions::default());

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        let detail = seen[0].clone().unwrap();
        assert_eq!(detail["toast"]["message"], "Hello");
        assert_eq!(detail["toast"]["level"], "notice");
    }

    #[test]
    fn test_level_names_match_serde() {
        let json = serde_json::to_string(&LogLevel::ChangeValue).unwrap();
        assert_eq!(json, format!("\"{}\"", LogLevel::ChangeValue.name()));
    }
}
