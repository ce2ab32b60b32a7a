use anyhow::Result;
use forwarder_client::exporters::EventWriter;
use forwarder_client::{EventBuffer, FlushConfig, Forwarder};
use forwarder_common::config::OverflowPolicy;
use forwarder_common::event::Event;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn event(event_type: &str) -> Event {
    Event::builder().event_type(event_type).build()
}

#[derive(Clone, Default)]
pub struct CollectingWriter {
    delivered: Arc<Mutex<Vec<Event>>>,
}

impl CollectingWriter {
    pub fn types(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl EventWriter for CollectingWriter {
    async fn deliver(&self, events: &[Event]) -> Result<()> {
        self.delivered.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CollectingWriter"
    }
}

fn flush_config(max_batch_size: usize) -> FlushConfig {
    FlushConfig {
        max_batch_size,
        flush_interval: Duration::from_secs(60),
        sink_endpoint: "http://localhost:3000/agent".to_string(),
    }
}

pub fn forwarder_with(
    writer: CollectingWriter,
    max_batch_size: usize,
) -> Arc<Forwarder<CollectingWriter>> {
    Arc::new(Forwarder::new(flush_config(max_batch_size), writer))
}

/// Forwarder whose buffer rejects events past `capacity`.
pub fn rejecting_forwarder_with(
    writer: CollectingWriter,
    capacity: usize,
) -> Arc<Forwarder<CollectingWriter>> {
    Arc::new(Forwarder::with_buffer(
        flush_config(10),
        EventBuffer::bounded(capacity, OverflowPolicy::RejectNew),
        writer,
    ))
}
