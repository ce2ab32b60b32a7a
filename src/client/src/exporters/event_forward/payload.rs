use forwarder_common::event::Event;
use serde::Serialize;

/// Request body sent to the sink.
///
/// The single/batched split is a framing convenience only, both carry the
/// events in order.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum EventPayload<'a> {
    Single { event: &'a Event },
    Batch { events: &'a [Event] },
}

impl<'a> EventPayload<'a> {
    pub fn new(events: &'a [Event]) -> Self {
        match events {
            [event] => EventPayload::Single { event },
            _ => EventPayload::Batch { events },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EventPayload::Single { .. } => 1,
            EventPayload::Batch { events } => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
