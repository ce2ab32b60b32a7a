use super::EventSource;
use anyhow::{bail, Context, Result};
use forwarder_common::event::Event;
use forwarder_common::Config;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Pulls events from a "next event" endpoint.
///
/// `200` carries one event, `204` means nothing is ready yet and the source
/// sleeps for the poll interval before asking again. Any other status or a
/// network error is handed back to the pump, which backs off and retries.
pub struct PollingSource {
    client: Client,
    endpoint: String,
    poll_interval: Duration,
}

impl PollingSource {
    pub fn new(endpoint: impl Into<String>, poll_interval: Duration) -> Self {
        PollingSource {
            client: Client::new(),
            endpoint: endpoint.into(),
            poll_interval,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config
            .source_endpoint
            .clone()
            .context("source_endpoint is required for the poll source")?;
        Ok(Self::new(
            endpoint,
            Duration::from_millis(config.source_poll_interval_ms),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EventSource for PollingSource {
    async fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            let response = self
                .client
                .get(&self.endpoint)
                .send()
                .await
                .with_context(|| format!("failed to poll {}", self.endpoint))?;

            match response.status() {
                StatusCode::OK => {
                    let value: Value = response
                        .json()
                        .await
                        .context("failed to read polled event body")?;
                    match Event::from_value(value) {
                        Ok(event) => return Ok(Some(event)),
                        Err(e) => warn!("Skipping polled record: {}", e),
                    }
                }
                StatusCode::NO_CONTENT => {
                    debug!("No event ready at {}", self.endpoint);
                    tokio::time::sleep(self.poll_interval).await;
                }
                status => bail!("source {} returned {}", self.endpoint, status),
            }
        }
    }

    fn name(&self) -> &'static str {
        "poll"
    }
}
