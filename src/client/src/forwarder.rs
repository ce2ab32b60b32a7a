use crate::buffer::{BufferStats, EventBuffer};
use crate::error::ForwarderError;
use crate::exporters::{EventWriter, EventWriterEnum};
use crate::flush::{FlushConfig, FlushExecutor, FlushStats};
use crate::shutdown::{DrainReport, ShutdownCoordinator, ShutdownState};
use crate::trigger::FlushTimer;
use forwarder_common::event::Event;
use forwarder_common::Config;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Snapshot served by the daemon's `/info` route.
#[derive(Debug, Clone, Serialize)]
pub struct ForwarderInfo {
    pub state: ShutdownState,
    pub buffered: usize,
    pub max_batch_size: usize,
    pub flush_interval_ms: u64,
    pub sink_endpoint: String,
    pub buffer: BufferStats,
    pub flush: FlushStats,
}

/// Entry point for producers.
///
/// Owns the buffer and wires the size trigger, the periodic timer and the
/// shutdown coordinator around one [`FlushExecutor`].
pub struct Forwarder<W: EventWriter = EventWriterEnum> {
    config: FlushConfig,
    buffer: Arc<EventBuffer>,
    executor: Arc<FlushExecutor<W>>,
    shutdown: ShutdownCoordinator<W>,
}

impl<W: EventWriter> Forwarder<W> {
    pub fn new(config: FlushConfig, writer: W) -> Self {
        Self::with_buffer(config, EventBuffer::unbounded(), writer)
    }

    pub fn with_buffer(config: FlushConfig, buffer: EventBuffer, writer: W) -> Self {
        let buffer = Arc::new(buffer);
        let executor = Arc::new(FlushExecutor::new(buffer.clone(), writer));
        let shutdown = ShutdownCoordinator::new(executor.clone());

        Forwarder {
            config,
            buffer,
            executor,
            shutdown,
        }
    }

    pub fn from_config(config: &Config, writer: W) -> Self {
        let buffer = EventBuffer::with_policy(config.max_buffer_size, config.overflow_policy);
        Self::with_buffer(FlushConfig::from(config), buffer, writer)
    }

    /// Accepts one event and runs the size trigger.
    ///
    /// A failed size-triggered flush is not an error for the producer: the
    /// event is buffered and the batch waits for the next trigger.
    pub async fn record(&self, event: Event) -> Result<(), ForwarderError> {
        event.validate()?;

        let len = self.buffer.enqueue(event).await?;
        debug!("Buffered event, {} pending", len);

        if len >= self.config.max_batch_size {
            if let Err(e) = self.executor.flush().await {
                debug!("Size-triggered flush failed: {}", e);
            }
        }
        Ok(())
    }

    /// Accepts a batch of events all-or-nothing and runs the size trigger
    /// once. Returns how many events were buffered.
    pub async fn record_batch(&self, events: Vec<Event>) -> Result<usize, ForwarderError> {
        for event in &events {
            event.validate()?;
        }
        let count = events.len();

        let len = self.buffer.enqueue_all(events).await?;
        debug!("Buffered {} events, {} pending", count, len);

        if len >= self.config.max_batch_size {
            if let Err(e) = self.executor.flush().await {
                debug!("Size-triggered flush failed: {}", e);
            }
        }
        Ok(count)
    }

    /// Like [`Forwarder::record`] for a raw JSON value from a producer.
    pub async fn record_value(&self, value: Value) -> Result<(), ForwarderError> {
        let event = Event::from_value(value).inspect_err(|e| warn!("Rejected event: {}", e))?;
        self.record(event).await
    }

    pub async fn flush(&self) -> Result<usize, ForwarderError> {
        self.executor.flush().await
    }

    /// Starts the periodic timer. Later calls are no-ops.
    pub async fn start(&self) {
        if self.shutdown.state() != ShutdownState::Running || self.shutdown.has_timer().await {
            return;
        }
        let handle = FlushTimer::spawn(
            self.executor.clone(),
            self.config.flush_interval,
            self.shutdown.timer_token(),
        );
        self.shutdown.attach_timer(handle).await;
    }

    pub async fn shutdown(&self) -> DrainReport {
        self.shutdown.shutdown().await
    }

    pub async fn wait_terminated(&self) {
        self.shutdown.wait_terminated().await
    }

    pub fn state(&self) -> ShutdownState {
        self.shutdown.state()
    }

    pub fn coordinator(&self) -> &ShutdownCoordinator<W> {
        &self.shutdown
    }

    pub async fn buffered(&self) -> usize {
        self.buffer.len().await
    }

    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    pub fn writer(&self) -> &W {
        self.executor.writer()
    }

    pub fn config(&self) -> &FlushConfig {
        &self.config
    }

    pub async fn info(&self) -> ForwarderInfo {
        ForwarderInfo {
            state: self.state(),
            buffered: self.buffered().await,
            max_batch_size: self.config.max_batch_size,
            flush_interval_ms: self.config.flush_interval.as_millis() as u64,
            sink_endpoint: self.config.sink_endpoint.clone(),
            buffer: self.buffer.stats(),
            flush: self.executor.stats(),
        }
    }
}
