#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use forwarder_common::Config;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};

#[derive(Default)]
struct SinkState {
    requests: Mutex<Vec<Value>>,
    failures_left: AtomicUsize,
}

/// HTTP sink on an ephemeral port that records every accepted body.
pub struct MockSink {
    pub url: String,
    state: Arc<SinkState>,
}

async fn receive(State(state): State<Arc<SinkState>>, Json(body): Json<Value>) -> StatusCode {
    let failing = state
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    state.requests.lock().unwrap().push(body);
    StatusCode::OK
}

impl MockSink {
    pub async fn start() -> Self {
        let state = Arc::new(SinkState::default());
        let router = Router::new()
            .route("/agent", post(receive))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });

        MockSink {
            url: format!("http://{}/agent", addr),
            state,
        }
    }

    /// The next `n` requests get a 503.
    pub fn fail_next(&self, n: usize) {
        self.state.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Event types across all accepted requests, in arrival order.
    pub fn delivered_types(&self) -> Vec<String> {
        self.requests()
            .iter()
            .flat_map(|body| match (body.get("event"), body.get("events")) {
                (Some(event), _) => vec![event.clone()],
                (_, Some(Value::Array(events))) => events.clone(),
                _ => vec![],
            })
            .filter_map(|event| event["type"].as_str().map(str::to_string))
            .collect()
    }

    pub async fn wait_for_requests(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.requests().len() >= n {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

pub fn config_for(sink: &MockSink, max_batch_size: usize, flush_interval_ms: u64) -> Config {
    Config {
        max_batch_size,
        flush_interval_ms,
        sink_endpoint: sink.url.clone(),
        sink_timeout_ms: 2_000,
        server: None,
        ..Config::default()
    }
}
