//! Harness: the callable surface of the diagnostics subsystem.
//!
//! Constructed once by the host and passed by reference to whatever binds
//! triggers to it.
//!
//! # Lifecycle
//! ```text
//! navigation start ─▶ on_ready()  client info, load overlay, health self-test
//!                  ─▶ on_load()   settle delay, navigation metrics
//! on demand        ─▶ test_endpoint / show_response_headers / probe_endpoint
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::clock::Clock;
use crate::config::{HarnessConfig, SelfTestConfig};
use crate::health::{ConnectivityProbe, ProbeResult};
use crate::inspect::ResponseInspector;
use crate::observability::{Diagnostic, DiagnosticSink};
use crate::overlay::{LoadReporter, OverlayHandle, Surface, TransientOverlay};
use crate::timing::{Collection, MetricsCollector, TimingSource};
use crate::transport::Transport;

/// Description of the client running the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub url: String,
    pub timestamp_ms: u64,
}

impl ClientInfo {
    pub fn gather(user_agent: &str, url: &str) -> Self {
        let language = std::env::var("LANG")
            .ok()
            .and_then(|lang| lang.split('.').next().map(|l| l.replace('_', "-")))
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| "und".to_string());

        Self {
            user_agent: user_agent.to_string(),
            language,
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            url: url.to_string(),
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }
}

/// Capabilities the harness is built from.
pub struct Capabilities {
    pub transport: Arc<dyn Transport>,
    pub clock: Arc<dyn Clock>,
    pub timing: Arc<dyn TimingSource>,
    pub surface: Arc<dyn Surface>,
    pub sink: Arc<dyn DiagnosticSink>,
}

/// Work started by `on_ready`.
#[derive(Debug)]
pub struct ReadyHandles {
    pub overlay: OverlayHandle,
    pub self_test: Option<JoinHandle<ProbeResult>>,
}

pub struct Harness {
    probe: Arc<ConnectivityProbe>,
    inspector: Arc<ResponseInspector>,
    collector: Arc<MetricsCollector>,
    reporter: LoadReporter,
    sink: Arc<dyn DiagnosticSink>,
    user_agent: String,
    page_url: String,
    self_test: SelfTestConfig,
    settle_delay: Duration,
}

impl Harness {
    pub fn new(config: &HarnessConfig, caps: Capabilities, navigation_start: Instant) -> Self {
        let host = Url::parse(&config.target.base_url)
            .map(|url| url.authority().to_string())
            .unwrap_or_else(|_| config.target.base_url.clone());

        let probe = ConnectivityProbe::new(caps.transport.clone(), caps.clock.clone(), caps.sink.clone());
        let inspector = ResponseInspector::new(caps.transport, caps.sink.clone());
        let collector = MetricsCollector::new(caps.timing, config.timing.negative_intervals, caps.sink.clone());
        let reporter = LoadReporter::new(
            caps.clock,
            navigation_start,
            TransientOverlay::new(caps.surface),
            config.overlay.clone(),
            host,
            caps.sink.clone(),
        );

        Self {
            probe: Arc::new(probe),
            inspector: Arc::new(inspector),
            collector: Arc::new(collector),
            reporter,
            sink: caps.sink,
            user_agent: config.target.user_agent.clone(),
            page_url: config.target.base_url.clone(),
            self_test: config.self_test.clone(),
            settle_delay: config.timing.settle_delay(),
        }
    }

    /// Page is ready: describe the client, show the load overlay and fire
    /// the health self-test.
    pub fn on_ready(&self) -> ReadyHandles {
        let client_info = ClientInfo::gather(&self.user_agent, &self.page_url);
        self.sink.record(&Diagnostic::ClientInfo(client_info));
        let overlay = self.reporter.report();

        let self_test = self
            .self_test
            .enabled
            .then(|| self.probe_endpoint(&self.self_test.path));

        ReadyHandles { overlay, self_test }
    }

    /// Load event fired: collect navigation metrics once the entry settles.
    pub fn on_load(&self) -> JoinHandle<Collection> {
        let collector = Arc::clone(&self.collector);
        let settle = self.settle_delay;
        tokio::spawn(async move { collector.collect_after_load(settle).await })
    }

    /// Report status and body length of `path`.
    pub fn test_endpoint(&self, path: &str) -> JoinHandle<()> {
        let inspector = Arc::clone(&self.inspector);
        let path = path.to_string();
        tokio::spawn(async move {
            let _ = inspector.inspect_body(&path).await;
        })
    }

    /// Report the response headers of `path`.
    pub fn show_response_headers(&self, path: &str) -> JoinHandle<()> {
        let inspector = Arc::clone(&self.inspector);
        let path = path.to_string();
        tokio::spawn(async move {
            let _ = inspector.inspect_headers(&path).await;
        })
    }

    /// Probe reachability and latency of `path`.
    pub fn probe_endpoint(&self, path: &str) -> JoinHandle<ProbeResult> {
        let probe = Arc::clone(&self.probe);
        let path = path.to_string();
        tokio::spawn(async move { probe.probe(&path).await })
    }
}
