//! Diagnostic sinks.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::health::ProbeResult;
use crate::observability::diagnostic::{Diagnostic, Severity};

/// Destination of diagnostics.
///
/// `record` is an atomic append of one whole group.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn record(&self, diagnostic: &Diagnostic);
}

macro_rules! emit {
    ($severity:expr, $($arg:tt)+) => {
        match $severity {
            Severity::Info => tracing::info!($($arg)+),
            Severity::Warn => tracing::warn!($($arg)+),
            Severity::Error => tracing::error!($($arg)+),
        }
    };
}

/// Renders diagnostics as tracing events, one event per line.
#[derive(Debug, Default)]
pub struct TracingSink {
    // keeps the lines of one group contiguous
    write_lock: Mutex<()>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        let group = diagnostic.group();
        let severity = diagnostic.severity();
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        match diagnostic {
            Diagnostic::Probe(result) => {
                let elapsed_ms = result.elapsed.as_secs_f64() * 1000.0;
                for line in diagnostic.lines() {
                    emit!(
                        severity,
                        group = %group,
                        probe_id = %result.id,
                        path = %result.path,
                        outcome = result.outcome.label(),
                        elapsed_ms,
                        "{}",
                        line
                    );
                }
            }
            _ => {
                let path = diagnostic.path().unwrap_or_default();
                for line in diagnostic.lines() {
                    emit!(severity, group = %group, path, "{}", line);
                }
            }
        }
    }
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn probes(&self) -> Vec<ProbeResult> {
        self.records()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::Probe(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    /// Group titles and lines, flattened for assertions.
    pub fn rendered(&self) -> Vec<(String, Vec<String>)> {
        self.records().iter().map(|d| (d.group(), d.lines())).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: &Diagnostic) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic.clone());
    }
}

/// Writes each diagnostic as one line of JSON.
pub struct JsonSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl DiagnosticSink for JsonSink {
    fn record(&self, diagnostic: &Diagnostic) {
        let line = match serde_json::to_string(diagnostic) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize diagnostic");
                return;
            }
        };

        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write diagnostic");
        }
    }
}

/// Forwards every diagnostic to several sinks, in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, diagnostic: &Diagnostic) {
        for sink in &self.sinks {
            sink.record(diagnostic);
        }
    }
}
