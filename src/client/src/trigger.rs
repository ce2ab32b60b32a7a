use crate::exporters::EventWriter;
use crate::flush::FlushExecutor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic flush, independent of buffer size.
pub struct FlushTimer;

impl FlushTimer {
    /// Fires every `period` until `cancel` is triggered.
    ///
    /// The first tick is one full period after start. A tick that lands while
    /// a flush is still in flight waits on the executor instead of stacking
    /// up, and late ticks are delayed rather than burst.
    pub fn spawn<W: EventWriter>(
        executor: Arc<FlushExecutor<W>>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let Some(start) = Instant::now().checked_add(period) else {
                warn!("Flush period {:?} is out of range, periodic flush disabled", period);
                cancel.cancelled().await;
                return;
            };
            let mut interval = interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!("Flush timer started with a period of {:?}", period);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Flush timer stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        // failures are logged by the executor and retried next tick
                        let _ = executor.flush().await;
                    }
                }
            }
        })
    }
}
