use crate::state::DaemonState;
use crate::structs::InfoResponse;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use forwarder_client::exporters::EventWriter;

pub const INFO_ENDPOINT: &str = "/info";

pub async fn info<W: EventWriter>(State(state): State<DaemonState<W>>) -> impl IntoResponse {
    let forwarder = state.forwarder();
    Json(InfoResponse {
        sink_writer: forwarder.writer().name(),
        forwarder: forwarder.info().await,
    })
}
