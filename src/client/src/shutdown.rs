use crate::exporters::{EventWriter, EventWriterEnum};
use crate::flush::FlushExecutor;
use forwarder_common::telemetry::{ErrorCategory, TelemetryContext};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownState {
    Running,
    Draining,
    Terminated,
}

/// Outcome of a shutdown request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainReport {
    /// The final flush succeeded (or had nothing to send).
    Drained { delivered: usize },
    /// The final flush failed; these events are still buffered and are lost
    /// when the process exits.
    Lost { events: usize, reason: String },
    /// Another caller already ran the drain.
    AlreadyTerminated,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        !matches!(self, DrainReport::Lost { .. })
    }
}

/// Drives `Running -> Draining -> Terminated`.
pub struct ShutdownCoordinator<W: EventWriter = EventWriterEnum> {
    executor: Arc<FlushExecutor<W>>,
    state: watch::Sender<ShutdownState>,
    timer_token: CancellationToken,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<W: EventWriter> ShutdownCoordinator<W> {
    pub fn new(executor: Arc<FlushExecutor<W>>) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        ShutdownCoordinator {
            executor,
            state,
            timer_token: CancellationToken::new(),
            timer: Mutex::new(None),
        }
    }

    /// Token the periodic timer listens on. Cancelled once the drain is done.
    pub fn timer_token(&self) -> CancellationToken {
        self.timer_token.clone()
    }

    /// Hands over the timer task so the drain can wait for it to stop.
    /// Returns false if a timer is already attached.
    pub async fn attach_timer(&self, handle: JoinHandle<()>) -> bool {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            handle.abort();
            return false;
        }
        *timer = Some(handle);
        true
    }

    pub async fn has_timer(&self) -> bool {
        self.timer.lock().await.is_some()
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    pub async fn wait_terminated(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives in self, so the channel cannot close while we wait
        let _ = rx
            .wait_for(|state| *state == ShutdownState::Terminated)
            .await;
    }

    /// Stops intake, runs one final flush and stops the timer.
    ///
    /// Safe to call more than once: later callers wait for the first drain
    /// to finish and get [`DrainReport::AlreadyTerminated`].
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) -> DrainReport {
        let started = self.state.send_if_modified(|state| {
            if *state == ShutdownState::Running {
                *state = ShutdownState::Draining;
                true
            } else {
                false
            }
        });
        if !started {
            self.wait_terminated().await;
            return DrainReport::AlreadyTerminated;
        }

        let buffer = self.executor.buffer();
        buffer.close().await;
        info!(
            "Shutting down, draining {} buffered events",
            buffer.len().await
        );

        let delivered_before = self.executor.stats().delivered_events;
        let drain = self.executor.flush().await;

        self.timer_token.cancel();
        let timer = self.timer.lock().await.take();
        if let Some(handle) = timer {
            if let Err(e) = handle.await {
                error!("Flush timer task failed: {}", e);
            }
        }

        // a timer tick queued behind the drain may still have delivered the batch
        let report = match drain {
            Ok(delivered) => DrainReport::Drained { delivered },
            Err(e) => {
                let events = buffer.len().await;
                if events == 0 {
                    let delivered = self.executor.stats().delivered_events - delivered_before;
                    DrainReport::Drained {
                        delivered: delivered as usize,
                    }
                } else {
                    warn!(
                        "Drain flush failed, {} events will be lost at exit: {}",
                        events, e
                    );
                    TelemetryContext::new("shutdown", ErrorCategory::DrainFailure)
                        .with_event_count(events)
                        .with_error(&e)
                        .report_to_sentry(
                            "drain_failure",
                            "Events lost on shutdown",
                            sentry::Level::Error,
                        );
                    DrainReport::Lost {
                        events,
                        reason: e.to_string(),
                    }
                }
            }
        };

        if let Err(e) = self.executor.close().await {
            warn!("Failed to close sink writer: {:#}", e);
        }

        self.state.send_replace(ShutdownState::Terminated);
        info!("Shutdown complete: {:?}", report);
        report
    }
}
