use crate::state::DaemonState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use forwarder_client::exporters::EventWriter;
use tracing::info;

pub const TERMINATE_ENDPOINT: &str = "/terminate";

pub async fn terminate<W: EventWriter>(State(state): State<DaemonState<W>>) -> impl IntoResponse {
    info!("Termination requested over HTTP");
    state.cancel();
    (StatusCode::ACCEPTED, "Terminating...")
}
