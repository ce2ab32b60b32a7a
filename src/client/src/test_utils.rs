use crate::exporters::event_writer::EventWriter;
use anyhow::{bail, Result};
use forwarder_common::event::Event;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn event(event_type: &str) -> Event {
    Event::builder().event_type(event_type).build()
}

pub fn types_of(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.event_type.as_str()).collect()
}

/// Sink stand-in that records every delivered batch.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    delivered: Arc<Mutex<Vec<Vec<Event>>>>,
    calls: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

/// Lets a test hold a delivery in flight.
#[derive(Clone)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` deliveries fail.
    pub fn failing_times(n: usize) -> Self {
        let writer = Self::default();
        writer.fail_next(n);
        writer
    }

    pub fn gated(self) -> (Self, Gate) {
        let gate = Gate {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        (
            RecordingWriter {
                gate: Some(gate.clone()),
                ..self
            },
            gate,
        )
    }

    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<Vec<Event>> {
        self.delivered.lock().unwrap().clone()
    }

    /// All successfully delivered events, in delivery order.
    pub fn delivered_types(&self) -> Vec<String> {
        self.delivered()
            .iter()
            .flatten()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EventWriter for RecordingWriter {
    async fn deliver(&self, events: &[Event]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            bail!("sink unavailable");
        }

        self.delivered.lock().unwrap().push(events.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RecordingWriter"
    }
}
