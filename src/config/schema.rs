//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the diagnostic harness.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Server under test.
    pub target: TargetConfig,

    /// Health self-test fired once the page is ready.
    pub self_test: SelfTestConfig,

    /// Load-time overlay settings.
    pub overlay: OverlayConfig,

    /// Navigation timing collection.
    pub timing: TimingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Target server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL that request paths are resolved against.
    pub base_url: String,

    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Optional per-request deadline in milliseconds. Absent means requests
    /// may wait indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            user_agent: concat!("pageprobe/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_ms: None,
        }
    }
}

impl TargetConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Health self-test configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelfTestConfig {
    /// Probe the server once the page is ready.
    pub enabled: bool,

    /// Path to probe.
    pub path: String,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/status".to_string(),
        }
    }
}

/// Transient overlay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Time the overlay stays fully visible, in milliseconds.
    pub ttl_ms: u64,

    /// Fade-out duration, in milliseconds.
    pub fade_ms: u64,

    /// Message template. `{load_ms}` and `{host}` are substituted.
    pub message: String,
}

impl OverlayConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 5000,
            fade_ms: 500,
            message: "Page loaded in {load_ms}ms\nStatic files served by {host}".to_string(),
        }
    }
}

/// How negative timing intervals are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeIntervalPolicy {
    /// Report negative intervals as zero.
    #[default]
    Clamp,
    /// Report the raw difference.
    Raw,
}

/// Navigation timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay after the load event before the timing entry is read.
    pub settle_delay_ms: u64,

    /// Policy for intervals that come out negative.
    pub negative_intervals: NegativeIntervalPolicy,
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 100,
            negative_intervals: NegativeIntervalPolicy::Clamp,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Also write every diagnostic as a JSON line on stdout.
    pub json: bool,

    /// Install the Prometheus recorder and print its exposition on exit.
    pub metrics_dump: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_dump: false,
        }
    }
}
