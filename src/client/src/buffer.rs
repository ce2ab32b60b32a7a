use crate::error::ForwarderError;
use forwarder_common::config::OverflowPolicy;
use forwarder_common::event::Event;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::warn;

struct BufferInner {
    events: VecDeque<Event>,
    // set once draining starts, checked under the same lock as enqueue
    closed: bool,
}

/// Ordered queue of events waiting for the next flush.
///
/// Every mutation happens under one lock that is only held for the
/// duration of the operation, never across a sink call. A batch that failed
/// delivery goes back to the head with [`EventBuffer::prepend`], ahead of
/// anything enqueued while it was in flight, so producer order survives
/// failures.
pub struct EventBuffer {
    inner: Mutex<BufferInner>,
    capacity: Option<usize>,
    overflow_policy: OverflowPolicy,

    total_enqueued: AtomicU64,
    total_dropped: AtomicU64,
    total_requeued: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub total_enqueued: u64,
    pub total_dropped: u64,
    pub total_requeued: u64,
}

impl EventBuffer {
    /// No ceiling: the buffer grows for as long as the sink keeps failing.
    pub fn unbounded() -> Self {
        Self::with_policy(None, OverflowPolicy::default())
    }

    pub fn bounded(capacity: usize, overflow_policy: OverflowPolicy) -> Self {
        Self::with_policy(Some(capacity), overflow_policy)
    }

    pub fn with_policy(capacity: Option<usize>, overflow_policy: OverflowPolicy) -> Self {
        EventBuffer {
            inner: Mutex::new(BufferInner {
                events: VecDeque::new(),
                closed: false,
            }),
            capacity,
            overflow_policy,
            total_enqueued: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_requeued: AtomicU64::new(0),
        }
    }

    /// Appends to the tail and returns the new length.
    pub async fn enqueue(&self, event: Event) -> Result<usize, ForwarderError> {
        self.enqueue_all(vec![event]).await
    }

    /// Appends a whole batch under one lock: either every event is accepted
    /// or none is.
    ///
    /// Under [`OverflowPolicy::DropOldest`] the batch always goes in and the
    /// head is trimmed back to the ceiling afterwards.
    pub async fn enqueue_all(&self, events: Vec<Event>) -> Result<usize, ForwarderError> {
        let mut inner = self.inner.lock().await;

        if inner.closed {
            return Err(ForwarderError::ShuttingDown);
        }

        let count = events.len();
        if let (Some(capacity), OverflowPolicy::RejectNew) = (self.capacity, self.overflow_policy) {
            if inner.events.len() + count > capacity {
                self.total_dropped.fetch_add(count as u64, Ordering::Relaxed);
                return Err(ForwarderError::BufferFull { capacity });
            }
        }

        inner.events.extend(events);
        self.total_enqueued.fetch_add(count as u64, Ordering::Relaxed);

        if let Some(capacity) = self.capacity {
            // a requeued batch can leave us above the ceiling too
            if inner.events.len() > capacity {
                let excess = inner.events.len() - capacity;
                inner.events.drain(..excess);
                self.total_dropped
                    .fetch_add(excess as u64, Ordering::Relaxed);
                warn!(
                    "Event buffer at capacity {}, dropped {} oldest event(s)",
                    capacity, excess
                );
            }
        }

        Ok(inner.events.len())
    }

    /// Takes everything currently buffered, leaving the buffer empty.
    pub async fn snapshot_and_clear(&self) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        Vec::from(std::mem::take(&mut inner.events))
    }

    /// Puts a batch back at the head, in its original order.
    ///
    /// Never drops anything: these events were already accepted.
    pub async fn prepend(&self, batch: Vec<Event>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len() as u64;

        let mut inner = self.inner.lock().await;
        let newer = std::mem::take(&mut inner.events);
        let mut restored = VecDeque::from(batch);
        restored.extend(newer);
        inner.events = restored;

        self.total_requeued.fetch_add(count, Ordering::Relaxed);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.events.is_empty()
    }

    /// Copy of the current contents, oldest first.
    pub async fn contents(&self) -> Vec<Event> {
        self.inner.lock().await.events.iter().cloned().collect()
    }

    /// Stops accepting new events. Contents stay in place for the drain.
    pub async fn close(&self) {
        self.inner.lock().await.closed = true;
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            total_enqueued: self.total_enqueued.load(Ordering::Relaxed),
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            total_requeued: self.total_requeued.load(Ordering::Relaxed),
        }
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::unbounded()
    }
}
