//! Navigation timing subsystem.
//!
//! # Data Flow
//! ```text
//! Page load (loader.rs):
//!     DNS → TCP connect → request → response → document processing
//!     → NavigationTiming recorded into a TimingSource
//!
//! Load settled (+ settle delay):
//!     collector.rs reads the entry once
//!     → six named intervals
//!     → Diagnostic::Metrics
//! ```
//!
//! # Design Decisions
//! - Timestamps are milliseconds relative to navigation start, like the
//!   browser's high-resolution time origin
//! - A missing entry is a feature absence, not an error

pub mod collector;
pub mod loader;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

pub use collector::{Collection, Metric, MetricsCollector};
pub use loader::{LoadError, PageLoad, PageLoader};

/// Timestamps of one page navigation, in ms since navigation start.
///
/// A phase that never happened stays at `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub start_time: f64,
    pub domain_lookup_start: f64,
    pub domain_lookup_end: f64,
    pub connect_start: f64,
    pub connect_end: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub response_end: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
}

/// Provider of the navigation timing entry.
pub trait TimingSource: Send + Sync + 'static {
    /// `None` when timing is not available at all.
    fn navigation_entry(&self) -> Option<NavigationTiming>;
}

/// Timing source filled in by whoever performed the navigation.
#[derive(Debug, Default)]
pub struct RecordedTiming {
    entry: Mutex<Option<NavigationTiming>>,
}

impl RecordedTiming {
    /// A source with no entry.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: NavigationTiming) -> Self {
        Self {
            entry: Mutex::new(Some(entry)),
        }
    }

    pub fn record(&self, entry: NavigationTiming) {
        *self.entry.lock().unwrap_or_else(|e| e.into_inner()) = Some(entry);
    }
}

impl TimingSource for RecordedTiming {
    fn navigation_entry(&self) -> Option<NavigationTiming> {
        *self.entry.lock().unwrap_or_else(|e| e.into_inner())
    }
}
