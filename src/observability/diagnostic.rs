//! Diagnostic reports.

use serde::Serialize;

use crate::harness::ClientInfo;
use crate::health::{Outcome, ProbeResult};
use crate::inspect::{BodySummary, HeaderListing, InspectionFailure, InspectionKind};
use crate::overlay::PageLoadReport;
use crate::timing::Metric;

/// Log level a diagnostic is emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// One grouped report produced by the harness.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Diagnostic {
    ClientInfo(ClientInfo),
    PageLoad(PageLoadReport),
    Probe(ProbeResult),
    Body(BodySummary),
    Headers(HeaderListing),
    Metrics(Vec<Metric>),
    InspectionFailed(InspectionFailure),
}

impl Diagnostic {
    /// Title of the group the lines belong to.
    pub fn group(&self) -> String {
        match self {
            Diagnostic::ClientInfo(_) => "Client Information".to_string(),
            Diagnostic::PageLoad(_) => "Page Load".to_string(),
            Diagnostic::Probe(result) => format!("Connectivity {}", result.path),
            Diagnostic::Body(summary) => format!("Endpoint {}", summary.path),
            Diagnostic::Headers(listing) => format!("Headers for {}", listing.path),
            Diagnostic::Metrics(_) => "Performance Metrics".to_string(),
            Diagnostic::InspectionFailed(failure) => match failure.kind {
                InspectionKind::Body => format!("Endpoint {}", failure.path),
                InspectionKind::Headers => format!("Headers for {}", failure.path),
            },
        }
    }

    /// Ordered, human readable lines of the group.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Diagnostic::ClientInfo(info) => vec![
                format!("User Agent: {}", info.user_agent),
                format!("Language: {}", info.language),
                format!("Platform: {}", info.platform),
                format!("Current URL: {}", info.url),
                format!("Load Timestamp: {}", info.timestamp_ms),
            ],
            Diagnostic::PageLoad(report) => {
                vec![format!("Page load time: {}ms", report.load_time.as_millis())]
            }
            Diagnostic::Probe(result) => {
                let ms = result.elapsed.as_millis();
                match &result.outcome {
                    Outcome::Success { .. } => vec![
                        format!("Server response time: {ms}ms"),
                        "Server connection: OK".to_string(),
                    ],
                    Outcome::NonOkStatus { status } => vec![
                        format!("Server response time: {ms}ms"),
                        format!("Server returned status: {status}"),
                    ],
                    Outcome::TransportFailure { message } => {
                        vec![format!("Server connection failed after {ms}ms: {message}")]
                    }
                }
            }
            Diagnostic::Body(summary) => vec![
                format!("{}: {} {}", summary.path, summary.status, summary.status_text),
                format!("Response length: {} characters", summary.body_length),
            ],
            Diagnostic::Headers(listing) => listing.headers.iter().map(ToString::to_string).collect(),
            Diagnostic::Metrics(metrics) => metrics
                .iter()
                .map(|m| format!("{}: {:.2}ms", m.name, m.duration_ms))
                .collect(),
            Diagnostic::InspectionFailed(failure) => {
                let mut lines = Vec::with_capacity(2);
                if let Some(line) = &failure.status {
                    lines.push(format!("{}: {} {}", failure.path, line.status, line.status_text));
                }
                lines.push(match failure.kind {
                    InspectionKind::Body => format!("Error testing {}: {}", failure.path, failure.message),
                    InspectionKind::Headers => {
                        format!("Error fetching headers for {}: {}", failure.path, failure.message)
                    }
                });
                lines
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Probe(result) => match result.outcome {
                Outcome::Success { .. } => Severity::Info,
                Outcome::NonOkStatus { .. } => Severity::Warn,
                Outcome::TransportFailure { .. } => Severity::Error,
            },
            Diagnostic::InspectionFailed(_) => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Path the diagnostic concerns, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Diagnostic::Probe(result) => Some(&result.path),
            Diagnostic::Body(summary) => Some(&summary.path),
            Diagnostic::Headers(listing) => Some(&listing.path),
            Diagnostic::InspectionFailed(failure) => Some(&failure.path),
            _ => None,
        }
    }
}
