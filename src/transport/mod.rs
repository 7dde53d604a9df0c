//! HTTP transport capability.
//!
//! # Data Flow
//! ```text
//! probe / inspector
//!     → Transport::get(path)
//!     → HttpResponse (status + ordered headers available immediately)
//!     → HttpResponse::text() (body resolved on demand)
//! ```
//!
//! # Design Decisions
//! - GET only; the harness never mutates server state
//! - The body is a deferred future so latency is measured at the response
//!   head, not after the full download
//! - Header order is whatever the transport yields; duplicates are kept

pub mod client;
pub mod mock;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;

pub use client::HttpTransport;
pub use mock::ScriptedTransport;

/// Errors raised while a request is in flight.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The path could not be turned into a request URL.
    #[error("invalid request target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// DNS, connect, or protocol level failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The configured request deadline expired.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The response head arrived but the body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// One response header, in transport order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for HeaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Deferred response body.
pub struct ResponseBody(BoxFuture<'static, Result<Vec<u8>, TransportError>>);

impl ResponseBody {
    pub fn new(fut: BoxFuture<'static, Result<Vec<u8>, TransportError>>) -> Self {
        Self(fut)
    }

    /// A body that is already in memory.
    pub fn ready(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self(Box::pin(async move { Ok(bytes) }))
    }

    pub async fn bytes(self) -> Result<Vec<u8>, TransportError> {
        self.0.await
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody(..)")
    }
}

/// A received response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<HeaderEntry>,
    pub body: ResponseBody,
}

impl HttpResponse {
    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Resolve the body and decode it as UTF-8, replacing invalid sequences.
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.body.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Asynchronous GET capability.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;
}

/// Reason phrase for a status code, empty when unknown.
pub fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}
