//! Event forwarding to a remote HTTP endpoint
//!
//! Batches are POSTed as JSON. A single event travels as `{"event": E}`,
//! several as `{"events": [E, ...]}`. Any non-2XX response, network error
//! or timeout fails the whole call.
//!
//! # Example
//!
//! ```rust,no_run
//! # use anyhow::Result;
//! # use forwarder_client::exporters::event_forward::EventForward;
//! # use forwarder_client::exporters::event_writer::EventWriter;
//! # use forwarder_common::Config;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let forwarder = EventForward::try_new(&Config::default())?;
//! forwarder.deliver(&[]).await?;
//! forwarder.close().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod payload;
mod retry;
mod telemetry;

pub use client::{EventForward, EventForwardConfig};
pub use error::{EventForwardError, EventForwardResult};
pub use payload::EventPayload;
pub use retry::RetryPolicy;
