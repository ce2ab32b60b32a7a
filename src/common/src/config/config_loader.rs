use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    CONFIG_PATH_ENV_VAR, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_PORT, ENV_PREFIX, FLUSH_INTERVAL_MS,
    LEGACY_SINK_ENDPOINT_ENV_VAR, MAX_BATCH_SIZE, MAX_FLUSH_INTERVAL_MS, SINK_ENDPOINT,
    SINK_ENDPOINT_ENV_VAR, SINK_MAX_ATTEMPTS, SINK_RETRY_DELAY_MS, SINK_TIMEOUT_MS,
    SOURCE_POLL_INTERVAL_MS, SOURCE_RETRY_DELAY_MS,
};
use config::builder::DefaultState;
use config::{Config as RConfig, ConfigBuilder, Environment, File, FileFormat};

/// What happens to a new event when the buffer is at `max_buffer_size`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    DropOldest,
    RejectNew,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::DropOldest => "drop_oldest",
            OverflowPolicy::RejectNew => "reject_new",
        }
    }
}

/// Where the daemon pulls events from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Newline delimited JSON on stdin
    #[default]
    Stdin,
    /// Repeated GET against `source_endpoint`
    Poll,
    /// Only the `POST /event` ingress route
    Http,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Stdin => "stdin",
            SourceKind::Poll => "poll",
            SourceKind::Http => "http",
        }
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stdin" => Ok(SourceKind::Stdin),
            "poll" => Ok(SourceKind::Poll),
            "http" => Ok(SourceKind::Http),
            other => bail!("unknown source `{}`, expected stdin, poll or http", other),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub max_batch_size: usize,
    pub flush_interval_ms: u64,
    pub sink_endpoint: String,
    pub sink_timeout_ms: u64,
    pub sink_max_attempts: usize,
    pub sink_retry_delay_ms: u64,

    pub max_buffer_size: Option<usize>,
    pub overflow_policy: OverflowPolicy,

    pub source: SourceKind,
    pub source_endpoint: Option<String>,
    pub source_poll_interval_ms: u64,
    pub source_retry_delay_ms: u64,

    pub server: Option<String>,

    pub log_level: String,
    pub log_dir: Option<String>,
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }

    pub fn sink_retry_delay(&self) -> Duration {
        Duration::from_millis(self.sink_retry_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            bail!("max_batch_size must be a positive integer");
        }
        if self.flush_interval_ms == 0 {
            bail!("flush_interval_ms must be a positive integer");
        }
        if self.flush_interval_ms > MAX_FLUSH_INTERVAL_MS {
            bail!(
                "flush_interval_ms must be at most {}, got {}",
                MAX_FLUSH_INTERVAL_MS,
                self.flush_interval_ms
            );
        }
        if self.sink_max_attempts == 0 {
            bail!("sink_max_attempts must be at least 1");
        }
        if self.max_buffer_size == Some(0) {
            bail!("max_buffer_size must be positive when set");
        }

        let sink = Url::parse(&self.sink_endpoint)
            .with_context(|| format!("invalid sink_endpoint `{}`", self.sink_endpoint))?;
        if !matches!(sink.scheme(), "http" | "https") {
            bail!(
                "sink_endpoint must be an http(s) URL, got scheme `{}`",
                sink.scheme()
            );
        }

        if self.source == SourceKind::Poll {
            let Some(endpoint) = self.source_endpoint.as_deref() else {
                bail!("source_endpoint is required when source = \"poll\"");
            };
            Url::parse(endpoint)
                .with_context(|| format!("invalid source_endpoint `{}`", endpoint))?;
        }

        if self.source == SourceKind::Http && self.server.is_none() {
            bail!("server must be set when source = \"http\"");
        }

        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = RConfig::builder()
            .set_default("max_batch_size", MAX_BATCH_SIZE as u64)?
            .set_default("flush_interval_ms", FLUSH_INTERVAL_MS)?
            .set_default("sink_endpoint", SINK_ENDPOINT)?
            .set_default("sink_timeout_ms", SINK_TIMEOUT_MS)?
            .set_default("sink_max_attempts", SINK_MAX_ATTEMPTS as u64)?
            .set_default("sink_retry_delay_ms", SINK_RETRY_DELAY_MS)?
            .set_default("overflow_policy", OverflowPolicy::default().as_str())?
            .set_default("source", SourceKind::default().as_str())?
            .set_default("source_poll_interval_ms", SOURCE_POLL_INTERVAL_MS)?
            .set_default("source_retry_delay_ms", SOURCE_RETRY_DELAY_MS)?
            .set_default("server", format!("127.0.0.1:{}", DEFAULT_SERVER_PORT))?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        Ok(builder)
    }

    pub fn load_default_config() -> Result<Config> {
        Self::load_config(None)
    }

    /// Layers defaults, the optional TOML file and `FORWARDER_*` variables.
    ///
    /// Without an explicit path the file named by `FORWARDER_CONFIG` is used
    /// when present.
    pub fn load_config(path: Option<&str>) -> Result<Config> {
        let mut builder = Self::builder_with_defaults()?;

        let path = path
            .map(str::to_string)
            .or_else(|| env::var(CONFIG_PATH_ENV_VAR).ok());

        if let Some(path) = path.as_deref() {
            if !Path::new(path).exists() {
                bail!("config file `{}` does not exist", path);
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        if env::var(SINK_ENDPOINT_ENV_VAR).is_err() {
            if let Ok(endpoint) = env::var(LEGACY_SINK_ENDPOINT_ENV_VAR) {
                builder = builder.set_override("sink_endpoint", endpoint)?;
            }
        }

        let mut config: Config = builder
            .build()?
            .try_deserialize()
            .context("failed to parse config file")?;

        // an empty address turns the control server off
        if config.server.as_deref().is_some_and(|s| s.trim().is_empty()) {
            config.server = None;
        }

        config.validate()?;

        Ok(config)
    }
}
