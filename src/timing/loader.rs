//! Timed page load.
//!
//! # Responsibilities
//! - Fetch the page document over a fresh HTTP/1.1 connection
//! - Timestamp each phase (DNS, connect, request, response, processing)
//! - Produce a `NavigationTiming` entry for the collector
//!
//! # Design Decisions
//! - DNS and TCP connect are driven here and the HTTP exchange is handed to
//!   a hyper connection, so phase boundaries stay observable; a pooled
//!   client would hide DNS and connect time
//! - The whole load shares one optional deadline and the document is capped
//!   at `MAX_DOCUMENT_BYTES`
//! - Only `http` is timed; other schemes leave timing unavailable

use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Empty, Limited};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::header::{ACCEPT, HOST, USER_AGENT};
use hyper::Request;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

use crate::clock::Clock;
use crate::timing::NavigationTiming;

/// Largest document body read before the load is abandoned.
pub const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("scheme '{0}' cannot be timed")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("no address found for {0}")]
    NoAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to read document: {0}")]
    Body(String),

    #[error("page load timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Outcome of a timed page load.
#[derive(Debug, Clone)]
pub struct PageLoad {
    pub timing: NavigationTiming,
    pub status: u16,
    /// Characters in the decoded document.
    pub document_length: usize,
}

pub struct PageLoader {
    clock: Arc<dyn Clock>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl PageLoader {
    pub fn new(clock: Arc<dyn Clock>, user_agent: impl Into<String>) -> Self {
        Self {
            clock,
            user_agent: user_agent.into(),
            timeout: None,
        }
    }

    /// Bound the whole load, from DNS lookup to the last body byte.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load `url`, timestamping phases relative to `navigation_start`.
    pub async fn load(&self, url: &Url, navigation_start: Instant) -> Result<PageLoad, LoadError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch(url, navigation_start))
                .await
                .map_err(|_| LoadError::Timeout(limit))?,
            None => self.fetch(url, navigation_start).await,
        }
    }

    async fn fetch(&self, url: &Url, navigation_start: Instant) -> Result<PageLoad, LoadError> {
        if url.scheme() != "http" {
            return Err(LoadError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url.host_str().ok_or(LoadError::MissingHost)?;
        let port = url.port_or_known_default().unwrap_or(80);
        let since_start = |at: Instant| at.saturating_duration_since(navigation_start).as_secs_f64() * 1000.0;

        let mut timing = NavigationTiming::default();

        timing.domain_lookup_start = since_start(self.clock.now());
        let addr = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| LoadError::NoAddress(host.to_string()))?;
        timing.domain_lookup_end = since_start(self.clock.now());

        timing.connect_start = since_start(self.clock.now());
        let stream = TcpStream::connect(addr).await?;
        timing.connect_end = since_start(self.clock.now());

        let (mut sender, connection) = http1::handshake(TokioIo::new(stream)).await?;
        // Aborted when the set drops, including when the deadline cancels the load.
        let mut driver = JoinSet::new();
        driver.spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "Page connection ended with error");
            }
        });

        let request = Request::builder()
            .uri(request_target(url))
            .header(HOST, authority(url))
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "text/html,*/*")
            .body(Empty::<Bytes>::new())?;

        timing.request_start = since_start(self.clock.now());
        let response = sender.send_request(request).await?;
        timing.response_start = since_start(self.clock.now());

        let status = response.status().as_u16();
        let document = Limited::new(response.into_body(), MAX_DOCUMENT_BYTES)
            .collect()
            .await
            .map_err(|e| LoadError::Body(e.to_string()))?
            .to_bytes();
        timing.response_end = since_start(self.clock.now());

        let document_length = String::from_utf8_lossy(&document).chars().count();
        timing.dom_content_loaded_event_end = since_start(self.clock.now());
        timing.load_event_end = since_start(self.clock.now());

        tracing::debug!(
            url = %url,
            status,
            bytes = document.len(),
            "Page load complete"
        );

        Ok(PageLoad {
            timing,
            status,
            document_length,
        })
    }
}

/// Origin-form request target: path plus query.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Host header value; the port is kept only when given explicitly.
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;

    #[test]
    fn request_target_and_host_from_url() {
        let url = Url::parse("http://localhost:8080/about.html?lang=en").unwrap();
        assert_eq!(request_target(&url), "/about.html?lang=en");
        assert_eq!(authority(&url), "localhost:8080");

        let url = Url::parse("http://example.com").unwrap();
        assert_eq!(request_target(&url), "/");
        assert_eq!(authority(&url), "example.com");
    }

    #[tokio::test]
    async fn https_is_not_timed() {
        let loader = PageLoader::new(Arc::new(SystemClock), "pageprobe-test");
        let url = Url::parse("https://example.com/").unwrap();
        let err = loader.load(&url, Instant::now()).await.unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedScheme(s) if s == "https"));
    }

    #[test]
    fn timeout_message_names_the_limit() {
        let err = LoadError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "page load timed out after 250ms");
    }
}
