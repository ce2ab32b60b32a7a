use crate::server::ForwarderServer;
use crate::source::{ChannelSource, PollingSource, StdinSource};
use anyhow::{Context, Result};
use forwarder_client::exporters::event_forward::EventForward;
use forwarder_client::exporters::EventWriterEnum;
use forwarder_client::{DrainReport, Forwarder};
use forwarder_common::config::SourceKind;
use forwarder_common::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds the forwarding pipeline from `config` and runs it to completion.
pub async fn run(config: Config) -> Result<DrainReport> {
    let writer = EventWriterEnum::Forward(
        EventForward::try_new(&config).context("Failed to create sink client")?,
    );
    info!(
        "Using {} towards {}",
        writer.variant_name(),
        config.sink_endpoint
    );

    let forwarder = Arc::new(Forwarder::from_config(&config, writer));
    info!(
        "Batching up to {} events, flushing every {} ms",
        config.max_batch_size, config.flush_interval_ms
    );

    let server = ForwarderServer::bind(
        forwarder,
        config.server.as_deref(),
        Duration::from_millis(config.source_retry_delay_ms),
    )
    .await?;

    match config.source {
        SourceKind::Stdin => server.run(Some(StdinSource::stdin()?)).await,
        SourceKind::Poll => {
            let source = PollingSource::from_config(&config)?;
            info!("Polling {} for events", source.endpoint());
            server.run(Some(source)).await
        }
        SourceKind::Http => server.run(None::<ChannelSource>).await,
    }
}
