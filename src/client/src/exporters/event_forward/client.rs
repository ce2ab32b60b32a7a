use super::error::EventForwardError;
use super::payload::EventPayload;
use super::retry::{self, RetryPolicy};
use crate::exporters::event_writer::EventWriter;
use anyhow::{Context, Result};
use forwarder_common::constants::SINK_CONNECT_TIMEOUT_MS;
use forwarder_common::event::Event;
use forwarder_common::Config;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for event forwarding
#[derive(Clone, Debug)]
pub struct EventForwardConfig {
    pub endpoint: String,
    pub client: Client,
    pub retry: RetryPolicy,
}

impl EventForwardConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        // the request timeout bounds every attempt, so a stuck sink surfaces as a failure
        let client = Client::builder()
            .timeout(config.sink_timeout())
            .connect_timeout(Duration::from_millis(SINK_CONNECT_TIMEOUT_MS))
            .build()
            .context("failed to build sink HTTP client")?;

        Ok(EventForwardConfig {
            endpoint: config.sink_endpoint.clone(),
            client,
            retry: RetryPolicy {
                max_attempts: config.sink_max_attempts,
                delay: config.sink_retry_delay(),
            },
        })
    }
}

/// Serialize and post one batch
pub async fn forward_events(config: &EventForwardConfig, events: &[Event]) -> Result<()> {
    if events.is_empty() {
        debug!("No events to send, skipping network call");
        return Ok(());
    }

    let start_time = Instant::now();
    let payload = EventPayload::new(events);
    let body = serde_json::to_vec(&payload).map_err(EventForwardError::from)?;

    retry::send_events_with_retry(
        &config.client,
        &config.endpoint,
        body,
        payload.len(),
        config.retry,
    )
    .await?;

    debug!("Event forwarding completed in {:?}", start_time.elapsed());
    Ok(())
}

/// HTTP client for forwarding events to the sink endpoint
pub struct EventForward {
    config: EventForwardConfig,
}

impl EventForward {
    pub fn try_new(config: &Config) -> Result<Self> {
        Ok(EventForward {
            config: EventForwardConfig::from_config(config)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Close the client (no-op for HTTP client)
    pub async fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl EventWriter for EventForward {
    async fn deliver(&self, events: &[Event]) -> Result<()> {
        forward_events(&self.config, events).await
    }

    async fn close(&self) -> Result<()> {
        EventForward::close(self).await
    }

    fn name(&self) -> &'static str {
        "EventForward"
    }
}
