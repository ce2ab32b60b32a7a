use crate::config::{Config, OverflowPolicy, SourceKind};
use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_SERVER_PORT, FLUSH_INTERVAL_MS, MAX_BATCH_SIZE, SINK_ENDPOINT,
    SINK_MAX_ATTEMPTS, SINK_RETRY_DELAY_MS, SINK_TIMEOUT_MS, SOURCE_POLL_INTERVAL_MS,
    SOURCE_RETRY_DELAY_MS,
};

impl Default for Config {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            flush_interval_ms: FLUSH_INTERVAL_MS,
            sink_endpoint: SINK_ENDPOINT.to_string(),
            sink_timeout_ms: SINK_TIMEOUT_MS,
            sink_max_attempts: SINK_MAX_ATTEMPTS,
            sink_retry_delay_ms: SINK_RETRY_DELAY_MS,

            max_buffer_size: None,
            overflow_policy: OverflowPolicy::DropOldest,

            source: SourceKind::Stdin,
            source_endpoint: None,
            source_poll_interval_ms: SOURCE_POLL_INTERVAL_MS,
            source_retry_delay_ms: SOURCE_RETRY_DELAY_MS,

            server: Some(format!("127.0.0.1:{}", DEFAULT_SERVER_PORT)),

            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            sentry_dsn: None,
        }
    }
}
