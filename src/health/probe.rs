//! Endpoint reachability and latency probe.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::clock::{serialize_millis, Clock};
use crate::observability::{Diagnostic, DiagnosticSink};
use crate::transport::Transport;

/// Classification of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// 2xx response.
    Success { status: u16 },
    /// Response outside the 2xx range.
    NonOkStatus { status: u16 },
    /// The request never produced a response.
    TransportFailure { message: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::NonOkStatus { .. } => "non_ok_status",
            Outcome::TransportFailure { .. } => "transport_failure",
        }
    }
}

/// Result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub id: Uuid,
    pub path: String,
    pub outcome: Outcome,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Success { status } | Outcome::NonOkStatus { status } => Some(status),
            Outcome::TransportFailure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::TransportFailure { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

pub struct ConnectivityProbe {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ConnectivityProbe {
    pub fn new(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { transport, clock, sink }
    }

    /// GET `path` once, time it, and classify the outcome.
    pub async fn probe(&self, path: &str) -> ProbeResult {
        let id = Uuid::new_v4();
        tracing::debug!(probe_id = %id, path, "Probe issued");

        let started = self.clock.now();
        let response = self.transport.get(path).await;
        let elapsed = self.clock.now().saturating_duration_since(started);

        let outcome = match response {
            Ok(response) if response.ok() => Outcome::Success { status: response.status },
            Ok(response) => Outcome::NonOkStatus { status: response.status },
            Err(e) => Outcome::TransportFailure { message: e.to_string() },
        };

        let result = ProbeResult {
            id,
            path: path.to_string(),
            outcome,
            elapsed,
        };
        self.sink.record(&Diagnostic::Probe(result.clone()));
        result
    }
}
