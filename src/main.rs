//! pageprobe: page diagnostics for a demo web server.
//!
//! # Architecture Overview
//!
//! ```text
//!   navigation start
//!        │
//!        ▼
//!   ┌────────────┐   NavigationTiming   ┌──────────────────┐
//!   │ PageLoader │─────────────────────▶│ MetricsCollector │──┐
//!   └────────────┘                      └──────────────────┘  │
//!        │ ready                                              │
//!        ▼                                                    ▼
//!   ┌──────────────┐  ┌───────────────────┐  ┌───────────────────────────┐
//!   │ LoadReporter │  │ ConnectivityProbe │  │ DiagnosticSink            │
//!   │  + overlay   │  │  ResponseInspector│─▶│ tracing / json / metrics  │
//!   └──────────────┘  └───────────────────┘  └───────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use url::Url;

use pageprobe::clock::{Clock, SystemClock};
use pageprobe::config::{load_config, HarnessConfig};
use pageprobe::observability::metrics::install_recorder;
use pageprobe::observability::{logging, DiagnosticSink, FanoutSink, JsonSink, MetricsSink, TracingSink};
use pageprobe::overlay::LogSurface;
use pageprobe::timing::{PageLoader, RecordedTiming};
use pageprobe::transport::HttpTransport;
use pageprobe::{Capabilities, Harness};

#[derive(Parser)]
#[command(name = "pageprobe")]
#[command(about = "Page load, health and response diagnostics for a web server", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `target.base_url`.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Write diagnostics as JSON lines on stdout.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the page and run the full diagnostics lifecycle
    Run,
    /// Report status and body length of each path
    Test {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List response headers of each path
    Headers {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Measure reachability and latency of each path
    Probe {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.target.base_url = base_url;
    }
    config.observability.json |= cli.json;

    logging::init(&config.observability);

    tracing::info!(
        base_url = %config.target.base_url,
        timeout_ms = ?config.target.request_timeout_ms,
        "pageprobe v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let prometheus = if config.observability.metrics_dump {
        Some(install_recorder()?)
    } else {
        None
    };

    let mut sinks = FanoutSink::new()
        .with(Arc::new(TracingSink::new()))
        .with(Arc::new(MetricsSink));
    if config.observability.json {
        sinks = sinks.with(Arc::new(JsonSink::stdout()));
    }
    let sink: Arc<dyn DiagnosticSink> = Arc::new(sinks);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let transport = Arc::new(HttpTransport::new(&config.target)?);
    let timing = Arc::new(RecordedTiming::absent());
    let navigation_start = clock.now();

    let harness = Harness::new(
        &config,
        Capabilities {
            transport: transport.clone(),
            clock: clock.clone(),
            timing: timing.clone(),
            surface: Arc::new(LogSurface::new()),
            sink,
        },
        navigation_start,
    );

    match cli.command {
        Commands::Run => {
            let page_url: Url = transport.base_url().clone();
            let loader = PageLoader::new(clock.clone(), config.target.user_agent.clone())
                .with_timeout(config.target.request_timeout());
            tokio::select! {
                loaded = loader.load(&page_url, navigation_start) => match loaded {
                    Ok(page) => {
                        tracing::debug!(status = page.status, document_length = page.document_length, "Page loaded");
                        timing.record(page.timing);
                    }
                    Err(e) => tracing::warn!(url = %page_url, error = %e, "Page load not timed"),
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!(url = %page_url, "Page load interrupted, continuing without timing");
                }
            }

            let ready = harness.on_ready();
            let collection = harness.on_load();

            if let Some(self_test) = ready.self_test {
                if let Err(e) = self_test.await {
                    tracing::error!(error = %e, "Self-test task failed");
                }
            }
            if let Err(e) = collection.await {
                tracing::error!(error = %e, "Metrics task failed");
            }

            tokio::select! {
                _ = ready.overlay.removed() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, not waiting for overlay");
                }
            }
        }
        Commands::Test { paths } => {
            join_all(paths.iter().map(|p| harness.test_endpoint(p))).await;
        }
        Commands::Headers { paths } => {
            join_all(paths.iter().map(|p| harness.show_response_headers(p))).await;
        }
        Commands::Probe { paths } => {
            join_all(paths.iter().map(|p| harness.probe_endpoint(p))).await;
        }
    }

    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }

    Ok(())
}
