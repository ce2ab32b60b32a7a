use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use typed_builder::TypedBuilder;

/// A structured record produced upstream and destined for the sink.
///
/// Only the `type` tag and the `properties` map are interpreted. Any other
/// top-level fields the producer attached are carried through untouched so
/// that forwarding never strips data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TypedBuilder)]
pub struct Event {
    #[serde(rename = "type")]
    #[builder(setter(into))]
    pub event_type: String,

    #[serde(default)]
    #[builder(default)]
    pub properties: Map<String, Value>,

    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}

/// Rejection of a single producer record that cannot be forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedEvent {
    reason: String,
}

impl MalformedEvent {
    pub fn new(reason: impl Into<String>) -> Self {
        MalformedEvent {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for MalformedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed event: {}", self.reason)
    }
}

impl std::error::Error for MalformedEvent {}

impl Event {
    pub fn new(event_type: impl Into<String>, properties: Map<String, Value>) -> Self {
        Event::builder()
            .event_type(event_type)
            .properties(properties)
            .build()
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Validates a raw JSON value and turns it into an event.
    pub fn from_value(value: Value) -> Result<Self, MalformedEvent> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(MalformedEvent::new(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        match object.get("type") {
            Some(Value::String(tag)) if !tag.trim().is_empty() => {}
            Some(Value::String(_)) => return Err(MalformedEvent::new("`type` must not be empty")),
            Some(other) => {
                return Err(MalformedEvent::new(format!(
                    "`type` must be a string, got {}",
                    json_kind(other)
                )))
            }
            None => return Err(MalformedEvent::new("missing `type` tag")),
        }

        if let Some(properties) = object.get("properties") {
            if !properties.is_object() {
                return Err(MalformedEvent::new(format!(
                    "`properties` must be an object, got {}",
                    json_kind(properties)
                )));
            }
        }

        serde_json::from_value(Value::Object(object)).map_err(|e| MalformedEvent::new(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, MalformedEvent> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| MalformedEvent::new(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Checks an already typed event before it is accepted into the buffer.
    pub fn validate(&self) -> Result<(), MalformedEvent> {
        if self.event_type.trim().is_empty() {
            return Err(MalformedEvent::new("`type` must not be empty"));
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
