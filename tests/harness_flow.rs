//! End-to-end harness behaviour with scripted transports.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pageprobe::clock::{Clock, SystemClock};
use pageprobe::config::HarnessConfig;
use pageprobe::health::Outcome;
use pageprobe::inspect::BodySummary;
use pageprobe::observability::{Diagnostic, MemorySink};
use pageprobe::overlay::MemorySurface;
use pageprobe::timing::{Collection, NavigationTiming, RecordedTiming};
use pageprobe::transport::mock::{ScriptedReply, ScriptedTransport};
use pageprobe::transport::HeaderEntry;
use pageprobe::{Capabilities, Harness};

struct Fixture {
    harness: Harness,
    transport: Arc<ScriptedTransport>,
    sink: Arc<MemorySink>,
    surface: Arc<MemorySurface>,
    timing: Arc<RecordedTiming>,
}

fn fixture(transport: ScriptedTransport) -> Fixture {
    fixture_with(transport, HarnessConfig::default())
}

fn fixture_with(transport: ScriptedTransport, config: HarnessConfig) -> Fixture {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sink = Arc::new(MemorySink::new());
    let surface = Arc::new(MemorySurface::new());
    let timing = Arc::new(RecordedTiming::absent());
    let transport = Arc::new(transport);
    let navigation_start = clock.now();

    let harness = Harness::new(
        &config,
        Capabilities {
            transport: transport.clone(),
            clock,
            timing: timing.clone(),
            surface: surface.clone(),
            sink: sink.clone(),
        },
        navigation_start,
    );

    Fixture {
        harness,
        transport,
        sink,
        surface,
        timing,
    }
}

#[tokio::test]
async fn every_probe_yields_exactly_one_result() {
    let transport = ScriptedTransport::new()
        .on("/ok", ScriptedReply::status(200).after(Duration::from_millis(5)))
        .on("/missing", ScriptedReply::status(404))
        .on("/broken", ScriptedReply::fail("connection reset").after(Duration::from_millis(2)));
    let f = fixture(transport);

    let paths = ["/ok", "/missing", "/broken", "/unrouted", "/ok"];
    let handles: Vec<_> = paths.iter().map(|p| f.harness.probe_endpoint(p)).collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(results.len(), paths.len());
    assert_eq!(f.sink.probes().len(), paths.len());
    for result in &results {
        assert!(result.elapsed >= Duration::ZERO);
    }
    assert!(results[0].is_success());
    assert_eq!(results[1].status_code(), Some(404));
    assert!(results[2].error_message().unwrap().contains("connection reset"));
    assert!(results[3].error_message().is_some());
}

#[tokio::test]
async fn status_probe_reports_503_as_non_ok() {
    let f = fixture(ScriptedTransport::new().on("/status", ScriptedReply::status(503)));

    let result = f.harness.probe_endpoint("/status").await.unwrap();
    assert_eq!(result.outcome, Outcome::NonOkStatus { status: 503 });
    assert_eq!(result.status_code(), Some(503));
    assert!(result.elapsed >= Duration::ZERO);
}

#[tokio::test]
async fn test_endpoint_reports_status_and_length() {
    let f = fixture(ScriptedTransport::new().on("/", ScriptedReply::body(200, "hello")));

    f.harness.test_endpoint("/").await.unwrap();

    assert_eq!(
        f.sink.records(),
        vec![Diagnostic::Body(BodySummary {
            path: "/".into(),
            status: 200,
            status_text: "OK".into(),
            body_length: 5,
        })]
    );
}

#[tokio::test]
async fn headers_reported_in_transport_order() {
    let reply = ScriptedReply::status(200)
        .with_header("content-type", "text/html")
        .with_header("x-demo", "1");
    let f = fixture(ScriptedTransport::new().on("/", reply));

    f.harness.show_response_headers("/").await.unwrap();

    match f.sink.records().as_slice() {
        [Diagnostic::Headers(listing)] => {
            assert_eq!(
                listing.headers,
                vec![
                    HeaderEntry::new("content-type", "text/html"),
                    HeaderEntry::new("x-demo", "1"),
                ]
            );
        }
        other => panic!("expected one header listing, got {other:?}"),
    }
    assert_eq!(
        f.sink.rendered()[0].1,
        vec!["content-type: text/html".to_string(), "x-demo: 1".to_string()]
    );
}

#[tokio::test]
async fn failures_never_escape_the_surface() {
    let f = fixture(ScriptedTransport::new());

    f.harness.test_endpoint("/nowhere").await.unwrap();
    f.harness.show_response_headers("/nowhere").await.unwrap();

    let records = f.sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|d| matches!(d, Diagnostic::InspectionFailed(_))));
}

#[tokio::test(start_paused = true)]
async fn ready_shows_overlay_until_ttl_plus_fade() {
    let f = fixture(ScriptedTransport::new().on("/status", ScriptedReply::status(200)));

    let ready = f.harness.on_ready();
    let id = ready.overlay.id();
    assert!(f.surface.contains(id));

    let self_test = ready.self_test.unwrap().await.unwrap();
    assert!(self_test.is_success());
    assert_eq!(f.transport.requests(), vec!["/status".to_string()]);

    tokio::time::sleep(Duration::from_millis(5200)).await;
    assert_eq!(f.surface.opacity(id), Some(0.0));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!f.surface.contains(id));

    let groups: Vec<String> = f.sink.rendered().into_iter().map(|(g, _)| g).collect();
    assert_eq!(groups[0], "Client Information");
    assert_eq!(groups[1], "Page Load");
    assert!(groups.contains(&"Connectivity /status".to_string()));
}

#[tokio::test]
async fn self_test_can_be_disabled() {
    let mut config = HarnessConfig::default();
    config.self_test.enabled = false;
    let transport = ScriptedTransport::new();
    let f = fixture_with(transport, config);

    let ready = f.harness.on_ready();
    assert!(ready.self_test.is_none());
    assert!(f.sink.probes().is_empty());
    assert!(f.transport.requests().is_empty());
}

#[tokio::test]
async fn repeated_probes_observe_server_changes() {
    let f = fixture(ScriptedTransport::new().on("/status", ScriptedReply::status(503)));

    let first = f.harness.probe_endpoint("/status").await.unwrap();
    f.transport.set("/status", ScriptedReply::status(200));
    let second = f.harness.probe_endpoint("/status").await.unwrap();

    assert_eq!(first.outcome, Outcome::NonOkStatus { status: 503 });
    assert!(second.is_success());
    assert_ne!(first.id, second.id);
    assert_eq!(f.transport.requests().len(), 2);
}

#[tokio::test]
async fn client_info_is_stamped_when_ready() {
    let mut config = HarnessConfig::default();
    config.self_test.enabled = false;
    let f = fixture_with(ScriptedTransport::new(), config);

    std::thread::sleep(Duration::from_millis(20));
    let before_ready = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64;
    f.harness.on_ready();

    match f.sink.records().first() {
        Some(Diagnostic::ClientInfo(info)) => assert!(info.timestamp_ms >= before_ready),
        other => panic!("expected client information first, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn missing_timing_is_silently_skipped() {
    let f = fixture(ScriptedTransport::new());

    let collection = f.harness.on_load().await.unwrap();
    assert_eq!(collection, Collection::Unavailable);
    assert!(f.sink.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn load_metrics_collected_after_settle() {
    let f = fixture(ScriptedTransport::new());
    f.timing.record(NavigationTiming {
        response_end: 10.0,
        dom_content_loaded_event_end: 25.0,
        load_event_end: 30.0,
        ..NavigationTiming::default()
    });

    let collection = f.harness.on_load().await.unwrap();
    let metrics = collection.metrics().unwrap();
    assert_eq!(metrics[4].name, "DOM Processing");
    assert_eq!(metrics[4].duration_ms, 15.0);
    assert_eq!(metrics[5].duration_ms, 30.0);
}

#[tokio::test]
async fn hung_endpoint_does_not_block_others() {
    let transport = ScriptedTransport::new()
        .on("/hang", ScriptedReply::Hang)
        .on("/status", ScriptedReply::status(200));
    let f = fixture(transport);

    let hung = f.harness.probe_endpoint("/hang");
    let ok = f.harness.probe_endpoint("/status").await.unwrap();

    assert!(ok.is_success());
    assert!(!hung.is_finished());
    assert_eq!(f.sink.probes().len(), 1);
    hung.abort();
}
