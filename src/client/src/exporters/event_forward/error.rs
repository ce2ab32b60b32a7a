use forwarder_common::telemetry::ErrorCategory;
use std::fmt;

/// Errors that can occur during event forwarding
#[derive(Debug)]
pub enum EventForwardError {
    /// Failed to serialize events to JSON
    Serialization(serde_json::Error),

    /// Network request failed or timed out
    Network(reqwest::Error),

    /// Server returned non-2XX status code
    Server { status: u16, body: String },
}

impl fmt::Display for EventForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventForwardError::Serialization(e) => write!(f, "Failed to serialize events: {}", e),
            EventForwardError::Network(e) if e.is_timeout() => {
                write!(f, "Network request timed out: {}", e)
            }
            EventForwardError::Network(e) => write!(f, "Network request failed: {}", e),
            EventForwardError::Server { status, body } => {
                write!(f, "Server error {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for EventForwardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventForwardError::Serialization(e) => Some(e),
            EventForwardError::Network(e) => Some(e),
            EventForwardError::Server { .. } => None,
        }
    }
}

impl From<serde_json::Error> for EventForwardError {
    fn from(err: serde_json::Error) -> Self {
        EventForwardError::Serialization(err)
    }
}

impl From<reqwest::Error> for EventForwardError {
    fn from(err: reqwest::Error) -> Self {
        EventForwardError::Network(err)
    }
}

impl EventForwardError {
    /// Get the telemetry error category for this error type
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            EventForwardError::Serialization(_) => ErrorCategory::SerializationFailure,
            EventForwardError::Network(_) => ErrorCategory::NetworkFailure,
            EventForwardError::Server { .. } => ErrorCategory::Non2xxResponse,
        }
    }

    /// Create a server error from response details
    pub fn server_error(status: u16, body: String) -> Self {
        EventForwardError::Server { status, body }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            EventForwardError::Serialization(_) => false,
            EventForwardError::Network(_) => true,
            // 5XX and 429 are worth another attempt, other 4XX are not
            EventForwardError::Server { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// Result type for event forwarding operations
pub type EventForwardResult<T> = Result<T, EventForwardError>;
