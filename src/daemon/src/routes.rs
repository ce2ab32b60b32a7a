use crate::handlers::event::{event, EVENT_ENDPOINT};
use crate::handlers::info::{info, INFO_ENDPOINT};
use crate::handlers::terminate::{terminate, TERMINATE_ENDPOINT};
use crate::state::DaemonState;
use axum::routing::{get, post};
use axum::Router;
use forwarder_client::exporters::EventWriter;

pub fn get_router<W: EventWriter>(state: DaemonState<W>) -> Router {
    Router::new()
        .route(EVENT_ENDPOINT, post(event::<W>))
        .route(TERMINATE_ENDPOINT, post(terminate::<W>))
        .route(INFO_ENDPOINT, get(info::<W>))
        .with_state(state)
}
