use forwarder_client::exporters::event_forward::EventForward;
use forwarder_client::exporters::EventWriterEnum;
use forwarder_client::{DrainReport, Forwarder, ForwarderError, ShutdownState};
use forwarder_common::event::Event;
use forwarder_common::Config;
use serde_json::json;
use std::time::Duration;

mod common;
use common::{config_for, MockSink};

fn forwarder(config: &Config) -> Forwarder {
    let writer = EventWriterEnum::Forward(EventForward::try_new(config).unwrap());
    Forwarder::from_config(config, writer)
}

fn event(event_type: &str) -> Event {
    Event::builder().event_type(event_type).build()
}

#[tokio::test]
async fn size_trigger_posts_batch_envelope() {
    let sink = MockSink::start().await;
    let forwarder = forwarder(&config_for(&sink, 2, 60_000));

    forwarder
        .record(event("a").with_property("n", 1))
        .await
        .unwrap();
    forwarder.record(event("b")).await.unwrap();

    assert_eq!(
        sink.requests(),
        vec![json!({"events": [
            {"type": "a", "properties": {"n": 1}},
            {"type": "b", "properties": {}}
        ]})]
    );
    assert_eq!(forwarder.buffered().await, 0);
}

#[tokio::test]
async fn single_event_uses_event_envelope() {
    let sink = MockSink::start().await;
    let forwarder = forwarder(&config_for(&sink, 1, 60_000));

    forwarder.record(event("only")).await.unwrap();

    assert_eq!(
        sink.requests(),
        vec![json!({"event": {"type": "only", "properties": {}}})]
    );
}

#[tokio::test]
async fn extra_fields_are_forwarded_untouched() {
    let sink = MockSink::start().await;
    let forwarder = forwarder(&config_for(&sink, 1, 60_000));

    forwarder
        .record_value(json!({"type": "session.idle", "properties": {}, "sessionID": "s1"}))
        .await
        .unwrap();

    assert_eq!(sink.requests()[0]["event"]["sessionID"], "s1");
}

#[tokio::test]
async fn timer_flushes_partial_batch() {
    let sink = MockSink::start().await;
    let forwarder = forwarder(&config_for(&sink, 10, 200));
    forwarder.start().await;

    for t in ["a", "b", "c"] {
        forwarder.record(event(t)).await.unwrap();
    }
    assert!(sink.requests().is_empty());
    assert_eq!(forwarder.buffered().await, 3);

    assert!(sink.wait_for_requests(1, Duration::from_secs(5)).await);
    assert_eq!(sink.delivered_types(), vec!["a", "b", "c"]);
    forwarder.shutdown().await;
}

#[tokio::test]
async fn non_2xx_requeues_until_timer_redelivers() {
    let sink = MockSink::start().await;
    sink.fail_next(1);
    let forwarder = forwarder(&config_for(&sink, 3, 200));
    forwarder.start().await;

    for t in ["a", "b", "c"] {
        forwarder.record(event(t)).await.unwrap();
    }
    assert!(sink.requests().is_empty());
    assert_eq!(forwarder.buffered().await, 3);

    assert!(sink.wait_for_requests(1, Duration::from_secs(5)).await);
    assert_eq!(sink.delivered_types(), vec!["a", "b", "c"]);
    assert_eq!(sink.requests().len(), 1);
    forwarder.shutdown().await;
}

#[tokio::test]
async fn explicit_flush_surfaces_transport_error() {
    let sink = MockSink::start().await;
    sink.fail_next(1);
    let forwarder = forwarder(&config_for(&sink, 10, 60_000));
    forwarder.record(event("a")).await.unwrap();

    let err = forwarder.flush().await.unwrap_err();
    assert!(matches!(err, ForwarderError::Transport(_)));
    assert!(err.to_string().contains("503"));
    assert_eq!(forwarder.buffered().await, 1);

    assert_eq!(forwarder.flush().await.unwrap(), 1);
    assert_eq!(sink.delivered_types(), vec!["a"]);
}

#[tokio::test]
async fn transport_retry_hides_transient_failure() {
    let sink = MockSink::start().await;
    sink.fail_next(1);
    let config = Config {
        sink_max_attempts: 2,
        sink_retry_delay_ms: 10,
        ..config_for(&sink, 2, 60_000)
    };
    let forwarder = forwarder(&config);

    forwarder.record(event("a")).await.unwrap();
    forwarder.record(event("b")).await.unwrap();

    assert_eq!(sink.delivered_types(), vec!["a", "b"]);
    assert_eq!(forwarder.info().await.flush.failed_attempts, 0);
}

#[tokio::test]
async fn shutdown_drains_pending_events() {
    let sink = MockSink::start().await;
    let forwarder = forwarder(&config_for(&sink, 10, 60_000));
    forwarder.start().await;

    forwarder.record(event("a")).await.unwrap();
    forwarder.record(event("b")).await.unwrap();

    assert_eq!(
        forwarder.shutdown().await,
        DrainReport::Drained { delivered: 2 }
    );
    assert_eq!(sink.delivered_types(), vec!["a", "b"]);
    assert_eq!(forwarder.buffered().await, 0);
    assert_eq!(forwarder.state(), ShutdownState::Terminated);
}

#[tokio::test]
async fn failed_drain_reports_loss() {
    let sink = MockSink::start().await;
    sink.fail_next(1);
    let forwarder = forwarder(&config_for(&sink, 10, 60_000));
    forwarder.record(event("a")).await.unwrap();

    let report = forwarder.shutdown().await;
    assert!(matches!(report, DrainReport::Lost { events: 1, .. }));
    assert!(sink.requests().is_empty());
}
