use crate::state::DaemonState;
use crate::structs::{events_from_body, AcceptedResponse, ErrorResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forwarder_client::exporters::EventWriter;
use forwarder_client::ForwarderError;
use forwarder_common::event::{Event, MalformedEvent};
use serde_json::Value;
use tracing::warn;

pub const EVENT_ENDPOINT: &str = "/event";

fn reject(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Push ingress. The whole body is validated and then buffered under one
/// lock, so a request is either accepted in full or leaves the buffer
/// untouched.
pub async fn event<W: EventWriter>(
    State(state): State<DaemonState<W>>,
    Json(body): Json<Value>,
) -> Response {
    let events = match events_from_body(body).and_then(|values| {
        values
            .into_iter()
            .map(Event::from_value)
            .collect::<Result<Vec<_>, MalformedEvent>>()
    }) {
        Ok(events) => events,
        Err(e) => {
            warn!("Rejected ingress request: {}", e);
            return reject(StatusCode::BAD_REQUEST, e);
        }
    };

    let accepted = match state.forwarder().record_batch(events).await {
        Ok(accepted) => accepted,
        Err(e @ ForwarderError::ShuttingDown) => {
            return reject(StatusCode::SERVICE_UNAVAILABLE, e)
        }
        Err(e @ ForwarderError::BufferFull { .. }) => {
            return reject(StatusCode::TOO_MANY_REQUESTS, e)
        }
        Err(e) => return reject(StatusCode::BAD_REQUEST, e),
    };

    (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted })).into_response()
}
