use forwarder_client::ForwarderInfo;
use forwarder_common::event::MalformedEvent;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub sink_writer: &'static str,
    #[serde(flatten)]
    pub forwarder: ForwarderInfo,
}

/// Splits an ingress body into raw event values.
///
/// Accepts a bare event, `{"event": E}` or `{"events": [E, ...]}`. A bare
/// event is recognised by its `type` tag, so an event that happens to carry
/// an `event` field is not unwrapped.
pub fn events_from_body(body: Value) -> Result<Vec<Value>, MalformedEvent> {
    let Value::Object(mut object) = body else {
        return Err(MalformedEvent::new("request body must be a JSON object"));
    };

    if object.contains_key("type") {
        return Ok(vec![Value::Object(object)]);
    }

    if let Some(events) = object.remove("events") {
        return match events {
            Value::Array(events) if !events.is_empty() => Ok(events),
            Value::Array(_) => Err(MalformedEvent::new("`events` must not be empty")),
            _ => Err(MalformedEvent::new("`events` must be an array")),
        };
    }

    if let Some(event) = object.remove("event") {
        return Ok(vec![event]);
    }

    Err(MalformedEvent::new(
        "expected an event, `{\"event\": ...}` or `{\"events\": [...]}`",
    ))
}
