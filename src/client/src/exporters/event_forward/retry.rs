use super::error::{EventForwardError, EventForwardResult};
use super::telemetry;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How many times one batch is attempted before the failure goes back to
/// the flush executor.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

/// Send an already serialized payload with retry logic
pub async fn send_events_with_retry(
    client: &Client,
    endpoint: &str,
    body: Vec<u8>,
    event_count: usize,
    policy: RetryPolicy,
) -> EventForwardResult<()> {
    let max_attempts = policy.max_attempts.max(1);

    info!("Sending {} events to {}", event_count, endpoint);

    for attempt in 1..=max_attempts {
        let start_time = Instant::now();

        match send_request(client, endpoint, body.clone()).await {
            Ok(()) => {
                debug!(
                    "Sent {} events on attempt {}, elapsed: {:?}",
                    event_count,
                    attempt,
                    start_time.elapsed()
                );
                return Ok(());
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    "Attempt {} failed (retrying): {}, elapsed: {:?}",
                    attempt,
                    e,
                    start_time.elapsed()
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                error!(
                    "Attempt {} failed: {}, elapsed: {:?}",
                    attempt,
                    e,
                    start_time.elapsed()
                );
                telemetry::report_forward_failure_to_sentry(endpoint, &e, event_count, attempt);
                return Err(e);
            }
        }
    }

    unreachable!("Loop should always return")
}

/// Send a single HTTP request
async fn send_request(client: &Client, endpoint: &str, body: Vec<u8>) -> EventForwardResult<()> {
    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(EventForwardError::server_error(status.as_u16(), body))
    }
}
