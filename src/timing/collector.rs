//! Navigation metrics collection.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::NegativeIntervalPolicy;
use crate::observability::{Diagnostic, DiagnosticSink};
use crate::timing::{NavigationTiming, TimingSource};

/// A named duration derived from the navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub duration_ms: f64,
}

/// Result of a collection attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Collected(Vec<Metric>),
    /// No timing entry exists; nothing was reported.
    Unavailable,
}

impl Collection {
    pub fn metrics(&self) -> Option<&[Metric]> {
        match self {
            Collection::Collected(metrics) => Some(metrics),
            Collection::Unavailable => None,
        }
    }
}

/// Reads the navigation entry and reports its phase durations.
pub struct MetricsCollector {
    source: Arc<dyn TimingSource>,
    policy: NegativeIntervalPolicy,
    sink: Arc<dyn DiagnosticSink>,
}

impl MetricsCollector {
    pub fn new(
        source: Arc<dyn TimingSource>,
        policy: NegativeIntervalPolicy,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { source, policy, sink }
    }

    /// Read the entry now and report the six intervals.
    pub fn collect(&self) -> Collection {
        let Some(entry) = self.source.navigation_entry() else {
            tracing::debug!("Navigation timing unavailable, skipping metrics");
            return Collection::Unavailable;
        };

        let metrics = derive_metrics(&entry, self.policy);
        self.sink.record(&Diagnostic::Metrics(metrics.clone()));
        Collection::Collected(metrics)
    }

    /// Wait for the last timing entry to settle, then collect.
    pub async fn collect_after_load(&self, settle: Duration) -> Collection {
        tokio::time::sleep(settle).await;
        self.collect()
    }
}

/// Compute the named intervals of a navigation entry.
pub fn derive_metrics(entry: &NavigationTiming, policy: NegativeIntervalPolicy) -> Vec<Metric> {
    let intervals = [
        ("DNS Lookup", entry.domain_lookup_start, entry.domain_lookup_end),
        ("TCP Connect", entry.connect_start, entry.connect_end),
        ("Request", entry.request_start, entry.response_start),
        ("Response", entry.response_start, entry.response_end),
        ("DOM Processing", entry.response_end, entry.dom_content_loaded_event_end),
        ("Total Load Time", entry.start_time, entry.load_event_end),
    ];

    intervals
        .into_iter()
        .map(|(name, from, to)| {
            let raw = to - from;
            let duration_ms = match policy {
                NegativeIntervalPolicy::Clamp if raw < 0.0 || raw.is_nan() => {
                    tracing::debug!(metric = name, raw_ms = raw, "Clamping negative interval to zero");
                    0.0
                }
                _ => raw,
            };
            Metric {
                name: name.to_string(),
                duration_ms,
            }
        })
        .collect()
}
