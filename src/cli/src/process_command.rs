use crate::commands::{Cli, Command};
use crate::daemon_client::DaemonClient;
use anyhow::{bail, Context, Result};
use clap::Parser;
use forwarder_common::logging::setup_logging;
use forwarder_common::sentry::Sentry;
use forwarder_common::{Config, ConfigLoader};
use forwarder_daemon::run;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    // Use the --config flag, if provided, when loading the configuration
    let mut config = ConfigLoader::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid configuration")?;

            setup_logging(&config)?;
            let _guard = Sentry::setup(config.sentry_dsn.as_deref());

            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(run(config));
            // blocking reads still parked on the runtime must not hold up exit
            runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

            let report = result?;
            info!("Exited after {:?}", report);
            Ok(())
        }
        Command::Config => {
            let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Info { json } => {
            let client = daemon_client(&config)?;
            let info = tokio::runtime::Runtime::new()?.block_on(client.send_info_request())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_info(&info);
            }
            Ok(())
        }
        Command::Terminate => {
            let client = daemon_client(&config)?;
            tokio::runtime::Runtime::new()?.block_on(client.send_terminate_request())?;
            println!("Forwarder is draining and will exit.");
            Ok(())
        }
    }
}

fn daemon_client(config: &Config) -> Result<DaemonClient> {
    let Some(server) = config.server.as_deref() else {
        bail!("No control server configured, set `server` to reach a running forwarder");
    };
    Ok(DaemonClient::new(format!("http://{}", server)))
}

fn print_info(info: &Value) {
    let field = |pointer: &str| match info.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    };

    println!("State:            {}", field("/state"));
    println!("Sink:             {} ({})", field("/sink_endpoint"), field("/sink_writer"));
    println!("Buffered events:  {}", field("/buffered"));
    println!("Max batch size:   {}", field("/max_batch_size"));
    println!("Flush interval:   {} ms", field("/flush_interval_ms"));
    println!("Delivered events: {}", field("/flush/delivered_events"));
    println!("Failed flushes:   {}", field("/flush/failed_attempts"));
    println!("Dropped events:   {}", field("/buffer/total_dropped"));
}
