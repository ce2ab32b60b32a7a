use super::EventSource;
use anyhow::Result;
use forwarder_common::event::Event;
use tokio::sync::mpsc;

/// In-process producer. Exhausted once every sender is dropped.
pub struct ChannelSource {
    rx: mpsc::Receiver<Event>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Event>) -> Self {
        ChannelSource { rx }
    }

    pub fn channel(capacity: usize) -> (mpsc::Sender<Event>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, ChannelSource::new(rx))
    }
}

impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.rx.recv().await)
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}
