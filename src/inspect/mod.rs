//! On-demand response inspection.
//!
//! # Responsibilities
//! - Report status, reason phrase and decoded body length of a path
//! - Enumerate response headers of a path in transport order
//! - Convert every failure into a diagnostic
//!
//! # Design Decisions
//! - Each call is its own request; nothing is cached between calls
//! - Body length counts characters of the decoded text, not bytes

use std::sync::Arc;

use serde::Serialize;

use crate::observability::{Diagnostic, DiagnosticSink};
use crate::transport::{HeaderEntry, Transport, TransportError};

/// Status and size of a fetched body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodySummary {
    pub path: String,
    pub status: u16,
    pub status_text: String,
    pub body_length: usize,
}

/// Headers of a fetched response, in transport order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderListing {
    pub path: String,
    pub headers: Vec<HeaderEntry>,
}

/// Which inspection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionKind {
    Body,
    Headers,
}

/// Status code and reason phrase of a response head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub status: u16,
    pub status_text: String,
}

/// A failed inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionFailure {
    pub path: String,
    pub kind: InspectionKind,
    /// Set when the response head arrived before the failure.
    pub status: Option<StatusLine>,
    pub message: String,
}

pub struct ResponseInspector {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ResponseInspector {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { transport, sink }
    }

    /// Fetch `path` and report status and decoded body length.
    pub async fn inspect_body(&self, path: &str) -> Result<BodySummary, InspectionFailure> {
        tracing::info!(path, "Testing endpoint: {path}");

        let failure = |status: Option<StatusLine>, e: TransportError| InspectionFailure {
            path: path.to_string(),
            kind: InspectionKind::Body,
            status,
            message: e.to_string(),
        };

        let result = match self.transport.get(path).await {
            Ok(response) => {
                let status = response.status;
                let status_text = response.status_text.clone();
                match response.text().await {
                    Ok(text) => Ok(BodySummary {
                        path: path.to_string(),
                        status,
                        status_text,
                        body_length: text.chars().count(),
                    }),
                    Err(e) => Err(failure(Some(StatusLine { status, status_text }), e)),
                }
            }
            Err(e) => Err(failure(None, e)),
        };

        match &result {
            Ok(summary) => self.sink.record(&Diagnostic::Body(summary.clone())),
            Err(failure) => self.sink.record(&Diagnostic::InspectionFailed(failure.clone())),
        }
        result
    }

    /// Fetch `path` and report every response header.
    pub async fn inspect_headers(&self, path: &str) -> Result<HeaderListing, InspectionFailure> {
        let result = match self.transport.get(path).await {
            Ok(response) => Ok(HeaderListing {
                path: path.to_string(),
                headers: response.headers,
            }),
            Err(e) => Err(InspectionFailure {
                path: path.to_string(),
                kind: InspectionKind::Headers,
                status: None,
                message: e.to_string(),
            }),
        };

        match &result {
            Ok(listing) => self.sink.record(&Diagnostic::Headers(listing.clone())),
            Err(failure) => self.sink.record(&Diagnostic::InspectionFailed(failure.clone())),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;
    use crate::transport::mock::{ScriptedReply, ScriptedTransport};
    use crate::transport::{HttpResponse, ResponseBody};
    use async_trait::async_trait;

    fn inspector(transport: impl Transport) -> (ResponseInspector, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (ResponseInspector::new(Arc::new(transport), sink.clone()), sink)
    }

    #[tokio::test]
    async fn body_summary_counts_characters() {
        let (inspector, sink) = inspector(ScriptedTransport::new().on("/", ScriptedReply::body(200, "héllo")));
        let summary = inspector.inspect_body("/").await.unwrap();

        assert_eq!(summary.status, 200);
        assert_eq!(summary.status_text, "OK");
        assert_eq!(summary.body_length, 5);
        assert_eq!(sink.records()[0].lines(), vec!["/: 200 OK", "Response length: 5 characters"]);
    }

    #[tokio::test]
    async fn non_ok_body_is_still_a_summary() {
        let (inspector, _) = inspector(ScriptedTransport::new().on("/nonexistent", ScriptedReply::body(404, "gone")));
        let summary = inspector.inspect_body("/nonexistent").await.unwrap();
        assert_eq!((summary.status, summary.status_text.as_str()), (404, "Not Found"));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_raised() {
        let (inspector, sink) = inspector(ScriptedTransport::new());
        let failure = inspector.inspect_body("/down").await.unwrap_err();

        assert_eq!(failure.kind, InspectionKind::Body);
        assert_eq!(failure.status, None);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].lines()[0].starts_with("Error testing /down:"));
    }

    struct BrokenBody;

    #[async_trait]
    impl Transport for BrokenBody {
        async fn get(&self, _path: &str) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                status_text: "OK".into(),
                headers: Vec::new(),
                body: ResponseBody::new(Box::pin(async { Err(TransportError::Body("stream reset".into())) })),
            })
        }
    }

    #[tokio::test]
    async fn body_read_failure_keeps_status_line() {
        let (inspector, sink) = inspector(BrokenBody);
        let failure = inspector.inspect_body("/").await.unwrap_err();
        assert_eq!(
            failure.status,
            Some(StatusLine {
                status: 200,
                status_text: "OK".into(),
            })
        );
        assert!(failure.message.contains("stream reset"));
        assert_eq!(sink.records()[0].lines()[0], "/: 200 OK");
    }

    #[tokio::test]
    async fn headers_preserve_order_and_duplicates() {
        let reply = ScriptedReply::status(200)
            .with_header("content-type", "text/html")
            .with_header("set-cookie", "a=1")
            .with_header("set-cookie", "b=2");
        let (inspector, sink) = inspector(ScriptedTransport::new().on("/", reply));

        let listing = inspector.inspect_headers("/").await.unwrap();
        let keys: Vec<&str> = listing.headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["content-type", "set-cookie", "set-cookie"]);

        let records = sink.records();
        assert_eq!(records[0].group(), "Headers for /");
        assert_eq!(records[0].lines()[2], "set-cookie: b=2");
    }

    #[tokio::test]
    async fn header_failure_is_reported() {
        let (inspector, sink) = inspector(ScriptedTransport::new().on("/", ScriptedReply::fail("dns error")));
        let failure = inspector.inspect_headers("/").await.unwrap_err();

        assert_eq!(failure.kind, InspectionKind::Headers);
        assert!(sink.records()[0].lines()[0].starts_with("Error fetching headers for /:"));
    }
}
