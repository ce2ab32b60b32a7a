pub const MAX_BATCH_SIZE: usize = 10;
pub const FLUSH_INTERVAL_MS: u64 = 5000;
// one day
pub const MAX_FLUSH_INTERVAL_MS: u64 = 86_400_000;
pub const SINK_ENDPOINT: &str = "http://localhost:3000/agent";
pub const SINK_TIMEOUT_MS: u64 = 30_000;
pub const SINK_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const SINK_MAX_ATTEMPTS: usize = 1;
pub const SINK_RETRY_DELAY_MS: u64 = 500;

pub const SOURCE_POLL_INTERVAL_MS: u64 = 1000;
pub const SOURCE_RETRY_DELAY_MS: u64 = 1000;

pub const DEFAULT_SERVER_PORT: u16 = 8723;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_FILE_NAME: &str = "forwarder.log";

pub const ENV_PREFIX: &str = "FORWARDER";
pub const CONFIG_PATH_ENV_VAR: &str = "FORWARDER_CONFIG";
pub const SINK_ENDPOINT_ENV_VAR: &str = "FORWARDER_SINK_ENDPOINT";
// older deployments configure the sink through this variable
pub const LEGACY_SINK_ENDPOINT_ENV_VAR: &str = "AGENT_ENDPOINT";
