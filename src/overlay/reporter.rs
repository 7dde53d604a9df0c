//! Page load reporting.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::clock::{serialize_millis, Clock};
use crate::config::OverlayConfig;
use crate::observability::{Diagnostic, DiagnosticSink};
use crate::overlay::state::OverlayState;
use crate::overlay::transient::{OverlayHandle, TransientOverlay};

/// Load time as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLoadReport {
    pub overlay_id: u64,
    #[serde(rename = "load_time_ms", serialize_with = "serialize_millis")]
    pub load_time: Duration,
}

pub struct LoadReporter {
    clock: Arc<dyn Clock>,
    navigation_start: Instant,
    overlay: TransientOverlay,
    config: OverlayConfig,
    host: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl LoadReporter {
    pub fn new(
        clock: Arc<dyn Clock>,
        navigation_start: Instant,
        overlay: TransientOverlay,
        config: OverlayConfig,
        host: impl Into<String>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            clock,
            navigation_start,
            overlay,
            config,
            host: host.into(),
            sink,
        }
    }

    /// Show the time elapsed since navigation start in a new overlay.
    pub fn report(&self) -> OverlayHandle {
        let now = self.clock.now();
        let load_time = now.saturating_duration_since(self.navigation_start);
        let message = render_message(&self.config.message, load_time, &self.host);

        let handle = self.overlay.render(OverlayState::new(
            message,
            now,
            self.config.ttl(),
            self.config.fade(),
        ));

        self.sink.record(&Diagnostic::PageLoad(PageLoadReport {
            overlay_id: handle.id().as_u64(),
            load_time,
        }));
        handle
    }
}

fn render_message(template: &str, load_time: Duration, host: &str) -> String {
    template
        .replace("{load_ms}", &load_time.as_millis().to_string())
        .replace("{host}", host)
}
