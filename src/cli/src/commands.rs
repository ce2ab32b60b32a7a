use clap::{Args, Parser, Subcommand};
use forwarder_common::config::SourceKind;
use forwarder_common::Config;

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "forwarder",
    about = "Batches structured events and forwards them to an HTTP sink",
    version
)]
pub struct Cli {
    #[clap(long, global = true)]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the forwarder in the foreground until interrupted or the source ends
    Run(RunArgs),

    /// Print the resolved configuration as TOML
    Config,

    /// Show the state of a running forwarder
    Info {
        /// Output information in JSON format
        #[clap(long)]
        json: bool,
    },

    /// Ask a running forwarder to drain and exit
    Terminate,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Flush as soon as this many events are buffered
    #[clap(long)]
    pub max_batch_size: Option<usize>,

    /// Flush at least this often, in milliseconds
    #[clap(long)]
    pub flush_interval_ms: Option<u64>,

    /// URL the batches are posted to
    #[clap(long)]
    pub sink_endpoint: Option<String>,

    /// Where events come from: stdin, poll or http
    #[clap(long)]
    pub source: Option<SourceKind>,

    /// "Next event" URL for the poll source
    #[clap(long)]
    pub source_endpoint: Option<String>,
}

impl RunArgs {
    pub fn apply(self, config: &mut Config) {
        if let Some(max_batch_size) = self.max_batch_size {
            config.max_batch_size = max_batch_size;
        }
        if let Some(flush_interval_ms) = self.flush_interval_ms {
            config.flush_interval_ms = flush_interval_ms;
        }
        if let Some(sink_endpoint) = self.sink_endpoint {
            config.sink_endpoint = sink_endpoint;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(source_endpoint) = self.source_endpoint {
            config.source_endpoint = Some(source_endpoint);
        }
    }
}
