//! Task counters keyed by flow, level and kind.
//!
//! Every change publishes the full counter state to the GUI.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logging::{GuiSink, GuiUpdate, LogLevel, LogOptions, Logger};

use super::text::{bulleted_list, first_letter};

// ============================================================================
// CounterEntry
// ============================================================================

/// One counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    /// Workflow name.
    pub flow: String,
    /// Task level, e.g. `reviewer`.
    pub level: String,
    /// What is counted, e.g. `submitted`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Current count.
    pub count: u32,
}

impl CounterEntry {
    fn is(&self, flow: &str, level: &str, kind: &str) -> bool {
        self.flow == flow && self.level == level && self.kind == kind
    }
}

impl fmt::Display for CounterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}: {}",
            first_letter(&self.flow),
            self.level,
            self.kind,
            self.count
        )
    }
}

// ============================================================================
// Counters
// ============================================================================

/// The counter set.
pub struct Counters {
    entries: Mutex<Vec<CounterEntry>>,
    logger: Arc<dyn Logger>,
    gui: Option<Arc<dyn GuiSink>>,
}

impl fmt::Debug for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.lock().iter()).finish()
    }
}

impl Counters {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            logger,
            gui: None,
        }
    }

    /// Publishes changes to `gui`.
    #[must_use]
    pub fn with_gui(mut self, gui: Arc<dyn GuiSink>) -> Self {
        self.gui = Some(gui);
        self
    }

    /// Increments a counter, creating it at 1. Returns the new count.
    pub fn add(&self, flow: &str, level: &str, kind: &str) -> u32 {
        let count = {
            let mut entries = self.entries.lock();
            match entries.iter_mut().find(|e| e.is(flow, level, kind)) {
                Some(entry) => {
                    entry.count += 1;
                    entry.count
                }
                None => {
                    entries.push(CounterEntry {
                        flow: flow.to_string(),
                        level: level.to_string(),
                        kind: kind.to_string(),
                        count: 1,
                    });
                    1
                }
            }
        };
        self.publish();
        count
    }

    /// Returns the count of a counter.
    #[must_use]
    pub fn get(&self, flow: &str, level: &str, kind: &str) -> Option<u32> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.is(flow, level, kind))
            .map(|e| e.count)
    }

    /// Returns every counter.
    #[must_use]
    pub fn all(&self) -> Vec<CounterEntry> {
        self.entries.lock().clone()
    }

    /// Returns every counter as a display line.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.entries.lock().iter().map(ToString::to_string).collect()
    }

    /// Removes one counter. Returns its last count.
    pub fn reset(&self, flow: &str, level: &str, kind: &str) -> Option<u32> {
        let removed = {
            let mut entries = self.entries.lock();
            let idx = entries.iter().position(|e| e.is(flow, level, kind))?;
            entries.remove(idx)
        };
        self.logger.log(
            LogLevel::Counter,
            &format!("Resetting counter {removed} from {}", removed.count),
            LogOptions::saved(),
        );
        self.publish();
        Some(removed.count)
    }

    /// Removes every counter.
    pub fn reset_all(&self) {
        let list = self.list();
        self.entries.lock().clear();
        self.logger.log(
            LogLevel::Counter,
            &format!("Resetting all counters:{}", bulleted_list(list)),
            LogOptions::saved(),
        );
        self.publish();
    }

    fn publish(&self) {
        if let Some(gui) = &self.gui {
            gui.update(GuiUpdate::Counters(self.all()));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::logging::Logbook;

    struct Recorder(Mutex<Vec<GuiUpdate>>);

    impl GuiSink for Recorder {
        fn update(&self, update: GuiUpdate) {
            self.0.lock().push(update);
        }
    }

    #[test]
    fn test_counter_lifecycle() {
        let counters = Counters::new(Arc::new(Logbook::default()));
        assert_eq!(counters.get("labels", "reviewer", "submitted"), None);
        assert_eq!(counters.add("labels", "reviewer", "submitted"), 1);
        assert_eq!(counters.add("labels", "reviewer", "submitted"), 2);
        assert_eq!(counters.get("labels", "reviewer", "submitted"), Some(2));
        assert_eq!(counters.reset("labels", "reviewer", "submitted"), Some(2));
        assert_eq!(counters.get("labels", "reviewer", "submitted"), None);
    }

    #[test]
    fn test_reset_one_keeps_others() {
        let counters = Counters::new(Arc::new(Logbook::default()));
        counters.add("labels", "reviewer", "submitted");
        counters.add("labels", "reviewer", "skipped");
        counters.reset("labels", "reviewer", "submitted");
        assert_eq!(counters.all().len(), 1);
        assert_eq!(counters.get("labels", "reviewer", "skipped"), Some(1));
    }

    #[test]
    fn test_list_and_reset_all_logs() {
        let logbook = Arc::new(Logbook::default());
        let counters = Counters::new(logbook.clone());
        counters.add("sitelinks", "analyst", "submitted");
        assert_eq!(counters.list(), ["Sitelinks (analyst) - submitted: 1"]);

        counters.reset_all();
        assert!(counters.all().is_empty());
        let logged = logbook.entries_at(LogLevel::Counter);
        assert_eq!(
            logged[0].message,
            "Resetting all counters:\n    * Sitelinks (analyst) - submitted: 1"
        );
    }

    #[test]
    fn test_changes_are_published() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let counters =
            Counters::new(Arc::new(Logbook::default())).with_gui(recorder.clone());
        counters.add("labels", "reviewer", "submitted");
        counters.reset_all();

        let updates = recorder.0.lock();
        assert_eq!(updates.len(), 2);
        assert!(matches!(&updates[1], GuiUpdate::Counters(c) if c.is_empty()));
    }
}
