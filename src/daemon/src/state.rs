use forwarder_client::exporters::{EventWriter, EventWriterEnum};
use forwarder_client::Forwarder;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct DaemonState<W: EventWriter = EventWriterEnum> {
    forwarder: Arc<Forwarder<W>>,
    cancellation_token: CancellationToken,
}

impl<W: EventWriter> Clone for DaemonState<W> {
    fn clone(&self) -> Self {
        DaemonState {
            forwarder: self.forwarder.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<W: EventWriter> DaemonState<W> {
    pub fn new(forwarder: Arc<Forwarder<W>>, cancellation_token: CancellationToken) -> Self {
        Self {
            forwarder,
            cancellation_token,
        }
    }

    pub fn forwarder(&self) -> &Forwarder<W> {
        &self.forwarder
    }

    /// Asks the run loop to start draining.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
