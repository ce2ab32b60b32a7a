use crate::buffer::EventBuffer;
use crate::error::ForwarderError;
use crate::exporters::{EventWriter, EventWriterEnum};
use forwarder_common::telemetry::TelemetryContext;
use forwarder_common::Config;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Batching parameters shared by the size trigger and the timer.
#[derive(Debug, Clone)]
pub struct FlushConfig {
    pub max_batch_size: usize,
    pub flush_interval: Duration,
    pub sink_endpoint: String,
}

impl From<&Config> for FlushConfig {
    fn from(config: &Config) -> Self {
        FlushConfig {
            max_batch_size: config.max_batch_size,
            flush_interval: config.flush_interval(),
            sink_endpoint: config.sink_endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushStats {
    pub flushes: u64,
    pub delivered_events: u64,
    pub failed_attempts: u64,
}

/// Moves the buffered batch to the sink.
///
/// At most one flush is in flight at a time. The `in_flight` lock is held
/// from snapshot until the batch is either delivered or back at the head of
/// the buffer, so a second trigger waits and then sees the re-queued events
/// in order.
pub struct FlushExecutor<W: EventWriter = EventWriterEnum> {
    buffer: Arc<EventBuffer>,
    writer: W,
    in_flight: Mutex<()>,

    flushes: AtomicU64,
    delivered_events: AtomicU64,
    failed_attempts: AtomicU64,
}

impl<W: EventWriter> FlushExecutor<W> {
    pub fn new(buffer: Arc<EventBuffer>, writer: W) -> Self {
        FlushExecutor {
            buffer,
            writer,
            in_flight: Mutex::new(()),
            flushes: AtomicU64::new(0),
            delivered_events: AtomicU64::new(0),
            failed_attempts: AtomicU64::new(0),
        }
    }

    /// Delivers everything currently buffered as one batch.
    ///
    /// Returns the number of delivered events, `Ok(0)` when there was nothing
    /// to send. On failure the batch is back at the head of the buffer before
    /// this returns.
    #[tracing::instrument(skip(self))]
    pub async fn flush(&self) -> Result<usize, ForwarderError> {
        let _in_flight = self.in_flight.lock().await;

        let batch = self.buffer.snapshot_and_clear().await;
        if batch.is_empty() {
            debug!("Flush skipped, buffer is empty");
            return Ok(0);
        }

        let count = batch.len();
        let start_time = Instant::now();

        match self.writer.deliver(&batch).await {
            Ok(()) => {
                self.flushes.fetch_add(1, Ordering::Relaxed);
                self.delivered_events
                    .fetch_add(count as u64, Ordering::Relaxed);
                info!(
                    "Flushed {} events in {:?}",
                    count,
                    start_time.elapsed()
                );
                Ok(count)
            }
            Err(e) => {
                self.failed_attempts.fetch_add(1, Ordering::Relaxed);
                self.buffer.prepend(batch).await;
                warn!(
                    "Flush of {} events failed, re-queued for the next attempt: {:#}",
                    count, e
                );

                let err = ForwarderError::Transport(e);
                TelemetryContext::new("flush_executor", err.error_category())
                    .with_event_count(count)
                    .with_error(&err)
                    .report_to_sentry(
                        "flush_failure",
                        "Flush failed, batch re-queued",
                        sentry::Level::Warning,
                    );
                Err(err)
            }
        }
    }

    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub async fn close(&self) -> anyhow::Result<()> {
        self.writer.close().await
    }

    pub fn stats(&self) -> FlushStats {
        FlushStats {
            flushes: self.flushes.load(Ordering::Relaxed),
            delivered_events: self.delivered_events.load(Ordering::Relaxed),
            failed_attempts: self.failed_attempts.load(Ordering::Relaxed),
        }
    }
}
