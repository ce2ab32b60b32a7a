use anyhow::{Context, Result};
use serde_json::Value;

/// Talks to the control routes of a running forwarder.
pub struct DaemonClient {
    base_url: String,
    client: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn send_terminate_request(&self) -> Result<()> {
        self.client
            .post(self.url("/terminate"))
            .send()
            .await
            .context("Failed to reach the forwarder. Is it running?")?
            .error_for_status()
            .context("Forwarder refused to terminate")?;
        Ok(())
    }

    pub async fn send_info_request(&self) -> Result<Value> {
        self.client
            .get(self.url("/info"))
            .send()
            .await
            .context("Failed to reach the forwarder. Is it running?")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse info response")
    }
}
