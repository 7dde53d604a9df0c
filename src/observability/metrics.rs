//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Forward diagnostics to the `metrics` facade
//! - Install the Prometheus recorder for hosts that want an exposition
//!
//! # Metrics
//! - `pageprobe_probes_total` (counter): probes by path, outcome
//! - `pageprobe_probe_duration_seconds` (histogram): probe latency by outcome
//! - `pageprobe_inspections_total` (counter): inspections by kind, result
//! - `pageprobe_page_load_seconds` (histogram): load time shown in the overlay
//! - `pageprobe_navigation_phase_milliseconds` (gauge): last navigation phases
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Labels stay low-cardinality: paths come from the operator, not traffic

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::observability::diagnostic::Diagnostic;
use crate::observability::sink::DiagnosticSink;

/// Install the global Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Sink that turns diagnostics into metric updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsSink;

impl DiagnosticSink for MetricsSink {
    fn record(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Probe(result) => {
                let outcome = result.outcome.label();
                metrics::counter!(
                    "pageprobe_probes_total",
                    "path" => result.path.clone(),
                    "outcome" => outcome
                )
                .increment(1);
                metrics::histogram!("pageprobe_probe_duration_seconds", "outcome" => outcome)
                    .record(result.elapsed.as_secs_f64());
            }
            Diagnostic::Body(summary) => {
                metrics::counter!(
                    "pageprobe_inspections_total",
                    "kind" => "body",
                    "result" => summary.status.to_string()
                )
                .increment(1);
            }
            Diagnostic::Headers(_) => {
                metrics::counter!("pageprobe_inspections_total", "kind" => "headers", "result" => "ok")
                    .increment(1);
            }
            Diagnostic::InspectionFailed(failure) => {
                let kind = match failure.kind {
                    crate::inspect::InspectionKind::Body => "body",
                    crate::inspect::InspectionKind::Headers => "headers",
                };
                metrics::counter!("pageprobe_inspections_total", "kind" => kind, "result" => "error")
                    .increment(1);
            }
            Diagnostic::PageLoad(report) => {
                metrics::histogram!("pageprobe_page_load_seconds").record(report.load_time.as_secs_f64());
            }
            Diagnostic::Metrics(phases) => {
                for phase in phases {
                    metrics::gauge!(
                        "pageprobe_navigation_phase_milliseconds",
                        "phase" => phase.name.clone()
                    )
                    .set(phase.duration_ms);
                }
            }
            Diagnostic::ClientInfo(_) => {}
        }
    }
}
