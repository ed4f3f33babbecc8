//! Processing statistics tracking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use super::types::SiftEvent;

/// Thread-safe event counters for traffic processing.
///
/// All event types are initialized to zero on creation, so incrementing is
/// lock-free. Shared across the traffic thread and the worker pool via
/// `Arc`.
pub struct ProcessingStats {
    events: HashMap<SiftEvent, AtomicUsize>,
}

impl ProcessingStats {
    /// Creates a tracker with every event counter at zero.
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in SiftEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        ProcessingStats { events }
    }

    /// Increments the counter for `event`.
    ///
    /// All variants are inserted in `new()`; a missing counter indicates an
    /// initialization bug, which is logged rather than panicking.
    pub fn increment(&self, event: SiftEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                event
            );
        }
    }

    /// Returns the current count for `event`.
    pub fn count(&self, event: SiftEvent) -> usize {
        self.events
            .get(&event)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Logs all non-zero counters at info level.
    pub fn log_summary(&self) {
        let mut any = false;
        for event in SiftEvent::iter() {
            let count = self.count(event);
            if count > 0 {
                log::info!("{}: {}", event.description(), count);
                any = true;
            }
        }
        if !any {
            log::info!("No script traffic was processed.");
        }
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
