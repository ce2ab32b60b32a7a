use crate::exporters::event_forward::EventForward;
use anyhow::Result;
use forwarder_common::event::Event;
use std::future::Future;

/// The sink transport seen by the flush executor.
///
/// A call either delivers the whole ordered batch or fails as a whole. Any
/// timeout is owned by the implementation and reported as a failure.
pub trait EventWriter: Send + Sync + 'static {
    fn deliver(&self, events: &[Event]) -> impl Future<Output = Result<()>> + Send;

    fn close(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    fn name(&self) -> &'static str;
}

pub enum EventWriterEnum {
    Forward(EventForward),
}

impl EventWriter for EventWriterEnum {
    async fn deliver(&self, events: &[Event]) -> Result<()> {
        match self {
            EventWriterEnum::Forward(client) => client.deliver(events).await,
        }
    }

    async fn close(&self) -> Result<()> {
        match self {
            EventWriterEnum::Forward(client) => client.close().await,
        }
    }

    fn name(&self) -> &'static str {
        self.variant_name()
    }
}

impl EventWriterEnum {
    pub fn variant_name(&self) -> &'static str {
        match self {
            EventWriterEnum::Forward(_) => "EventForward",
        }
    }
}
