use crate::sentry::Sentry;
use serde_json::json;
use std::collections::HashMap;

/// Categories of errors for telemetry reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NetworkFailure,
    Non2xxResponse,
    SerializationFailure,
    MalformedEvent,
    BufferOverflow,
    ShuttingDown,
    DrainFailure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NetworkFailure => "network_failure",
            ErrorCategory::Non2xxResponse => "non_2xx_response",
            ErrorCategory::SerializationFailure => "serialization_failure",
            ErrorCategory::MalformedEvent => "malformed_event",
            ErrorCategory::BufferOverflow => "buffer_overflow",
            ErrorCategory::ShuttingDown => "shutting_down",
            ErrorCategory::DrainFailure => "drain_failure",
        }
    }
}

/// Context builder for telemetry reporting
pub struct TelemetryContext {
    context: HashMap<String, serde_json::Value>,
}

impl TelemetryContext {
    pub fn new(component: &str, error_category: ErrorCategory) -> Self {
        let mut context = HashMap::new();

        context.insert("component".to_string(), json!(component));
        context.insert("error_type".to_string(), json!(error_category.as_str()));
        context.insert(
            "timestamp".to_string(),
            json!(chrono::Utc::now().timestamp()),
        );
        context.insert("process_id".to_string(), json!(std::process::id()));

        Self { context }
    }

    /// Add custom field to the context
    pub fn add_field<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.context.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn with_endpoint(self, endpoint: &str) -> Self {
        self.add_field("endpoint", endpoint)
    }

    pub fn with_http_status(self, status_code: u16) -> Self {
        self.add_field("status_code", status_code)
    }

    pub fn with_error<E>(self, error: &E) -> Self
    where
        E: std::fmt::Display + std::fmt::Debug,
    {
        self.add_field("error_message", error.to_string())
            .add_field("error_debug", format!("{:?}", error))
    }

    /// Add event count for batch operations
    pub fn with_event_count(self, count: usize) -> Self {
        self.add_field("event_count", count)
    }

    /// Add response body (truncated for large responses)
    pub fn with_response_body(self, body: &str) -> Self {
        let truncated_body = match body.char_indices().nth(1000) {
            Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
            None => body.to_string(),
        };
        self.add_field("response_body", truncated_body)
    }

    pub fn to_json(self) -> serde_json::Value {
        serde_json::Value::Object(self.context.into_iter().collect())
    }

    /// Report to Sentry with the given key and message
    pub fn report_to_sentry(self, sentry_key: &str, message: &str, level: sentry::Level) {
        let json_context = self.to_json();
        Sentry::add_extra(sentry_key, json_context);
        Sentry::capture_message(message, level);
    }
}
