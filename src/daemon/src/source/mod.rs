//! Producers that feed the forwarder.
//!
//! Pull-style sources implement [`EventSource`] and are driven by the
//! daemon's pump task. Push-style producers call
//! [`forwarder_client::Forwarder::record`] directly, the `POST /event`
//! ingress route is one of them.

mod channel;
mod polling;
mod stdin;

pub use channel::ChannelSource;
pub use polling::PollingSource;
pub use stdin::{LineSource, StdinSource};

use anyhow::Result;
use forwarder_common::event::Event;
use std::future::Future;

pub trait EventSource: Send + 'static {
    /// Next event from the producer. `Ok(None)` means the source is exhausted.
    ///
    /// Must be cancel safe: the pump drops the future when shutdown starts.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<Event>>> + Send;

    fn name(&self) -> &'static str;
}
