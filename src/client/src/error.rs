use forwarder_common::event::MalformedEvent;
use forwarder_common::telemetry::ErrorCategory;
use std::fmt;

/// Errors surfaced by the forwarding core. None of them is fatal to the
/// process.
#[derive(Debug)]
pub enum ForwarderError {
    /// Sink unreachable, non-2XX response or timeout. The batch was re-queued.
    Transport(anyhow::Error),

    /// The producer handed over a record that cannot be forwarded
    Malformed(MalformedEvent),

    /// The buffer is at its ceiling and the overflow policy rejects new events
    BufferFull { capacity: usize },

    /// Draining has begun, no new events are accepted
    ShuttingDown,
}

impl fmt::Display for ForwarderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwarderError::Transport(e) => write!(f, "Sink delivery failed: {:#}", e),
            ForwarderError::Malformed(e) => write!(f, "{}", e),
            ForwarderError::BufferFull { capacity } => {
                write!(f, "Event buffer is full ({} events)", capacity)
            }
            ForwarderError::ShuttingDown => write!(f, "Forwarder is shutting down"),
        }
    }
}

impl std::error::Error for ForwarderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ForwarderError::Transport(e) => Some(e.as_ref()),
            ForwarderError::Malformed(e) => Some(e),
            ForwarderError::BufferFull { .. } | ForwarderError::ShuttingDown => None,
        }
    }
}

impl From<MalformedEvent> for ForwarderError {
    fn from(err: MalformedEvent) -> Self {
        ForwarderError::Malformed(err)
    }
}

impl ForwarderError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            ForwarderError::Transport(e) => {
                match e.downcast_ref::<crate::exporters::event_forward::EventForwardError>() {
                    Some(forward_error) => forward_error.error_category(),
                    None => ErrorCategory::NetworkFailure,
                }
            }
            ForwarderError::Malformed(_) => ErrorCategory::MalformedEvent,
            ForwarderError::BufferFull { .. } => ErrorCategory::BufferOverflow,
            ForwarderError::ShuttingDown => ErrorCategory::ShuttingDown,
        }
    }
}
