use crate::routes::get_router;
use crate::signal::shutdown_signal;
use crate::source::EventSource;
use crate::state::DaemonState;
use anyhow::{Context, Result};
use forwarder_client::exporters::{EventWriter, EventWriterEnum};
use forwarder_client::{DrainReport, Forwarder, ForwarderError};
use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct ForwarderServer<W: EventWriter = EventWriterEnum> {
    forwarder: Arc<Forwarder<W>>,
    listener: Option<TcpListener>,
    source_retry_delay: Duration,
}

impl<W: EventWriter> ForwarderServer<W> {
    /// Binds the control routes when `server` is set. Without an address the
    /// daemon only runs its source and signal handling.
    pub async fn bind(
        forwarder: Arc<Forwarder<W>>,
        server: Option<&str>,
        source_retry_delay: Duration,
    ) -> Result<Self> {
        let listener = match server {
            Some(server) => Some(create_listener(server).await?),
            None => None,
        };

        Ok(ForwarderServer {
            forwarder,
            listener,
            source_retry_delay,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    pub fn forwarder(&self) -> &Arc<Forwarder<W>> {
        &self.forwarder
    }

    /// Runs until Ctrl+C/SIGTERM, `POST /terminate` or source exhaustion,
    /// then drains.
    pub async fn run<S: EventSource>(self, source: Option<S>) -> Result<DrainReport> {
        self.run_until(source, shutdown_signal()).await
    }

    /// Like [`ForwarderServer::run`] with a caller supplied shutdown trigger.
    pub async fn run_until<S, F>(self, source: Option<S>, signal: F) -> Result<DrainReport>
    where
        S: EventSource,
        F: Future<Output = ()> + Send,
    {
        let cancellation_token = CancellationToken::new();
        let state = DaemonState::new(self.forwarder.clone(), cancellation_token.clone());

        let server = self.listener.map(|listener| {
            if let Ok(addr) = listener.local_addr() {
                info!("Control server listening on {}", addr);
            }
            tokio::spawn(axum::serve(listener, get_router(state)).into_future())
        });

        self.forwarder.start().await;

        let pump = source.map(|source| {
            tokio::spawn(pump_source(
                source,
                self.forwarder.clone(),
                self.source_retry_delay,
                cancellation_token.clone(),
            ))
        });

        tokio::select! {
            _ = signal => {}
            _ = cancellation_token.cancelled() => {
                debug!("Run loop cancelled");
            }
        }

        // stop intake from the source before draining
        cancellation_token.cancel();
        if let Some(pump) = pump {
            if let Err(e) = pump.await {
                error!("Source task failed: {}", e);
            }
        }

        let report = self.forwarder.shutdown().await;

        if let Some(server) = server {
            server.abort();
        }

        match &report {
            DrainReport::Lost { events, reason } => {
                warn!("Exiting with {} undelivered events: {}", events, reason)
            }
            report => info!("Forwarder stopped: {:?}", report),
        }
        Ok(report)
    }
}

async fn create_listener(server: &str) -> Result<TcpListener> {
    let addr: SocketAddr = server
        .parse()
        .with_context(|| format!("invalid server address `{}`", server))?;

    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Err(e).with_context(|| {
            format!(
                "Failed to start forwarder: port {} is already in use",
                addr.port()
            )
        }),
        Err(e) => Err(e).with_context(|| format!("Failed to bind to address {}", addr)),
    }
}

/// Feeds events from `source` into the forwarder until the source is
/// exhausted or `cancellation_token` fires. Exhaustion requests shutdown.
pub async fn pump_source<S, W>(
    mut source: S,
    forwarder: Arc<Forwarder<W>>,
    retry_delay: Duration,
    cancellation_token: CancellationToken,
) where
    S: EventSource,
    W: EventWriter,
{
    let name = source.name();
    info!("Reading events from {} source", name);

    loop {
        let next = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            next = source.next_event() => next,
        };

        match next {
            Ok(Some(event)) => match forwarder.record(event).await {
                Ok(()) => {}
                Err(ForwarderError::ShuttingDown) => break,
                Err(e) => warn!("Dropped event from {} source: {}", name, e),
            },
            Ok(None) => {
                info!("{} source exhausted, shutting down", name);
                cancellation_token.cancel();
                break;
            }
            Err(e) => {
                warn!(
                    "{} source failed, retrying in {:?}: {:#}",
                    name, retry_delay, e
                );
                tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use crate::test_utils::{event, forwarder_with, CollectingWriter};
    use forwarder_client::ShutdownState;
    use std::future::pending;

    #[tokio::test]
    async fn test_source_exhaustion_drains_and_stops() {
        let writer = CollectingWriter::default();
        let forwarder = forwarder_with(writer.clone(), 10);
        let server = ForwarderServer::bind(forwarder.clone(), None, Duration::from_millis(10))
            .await
            .unwrap();

        let (tx, source) = ChannelSource::channel(8);
        for t in ["a", "b", "c"] {
            tx.send(event(t)).await.unwrap();
        }
        drop(tx);

        let report = server.run_until(Some(source), pending()).await.unwrap();

        assert_eq!(report, DrainReport::Drained { delivered: 3 });
        assert_eq!(writer.types(), vec!["a", "b", "c"]);
        assert_eq!(forwarder.state(), ShutdownState::Terminated);
    }

    #[tokio::test]
    async fn test_signal_stops_pump_and_drains() {
        let writer = CollectingWriter::default();
        let forwarder = forwarder_with(writer.clone(), 10);
        let server = ForwarderServer::bind(forwarder.clone(), None, Duration::from_millis(10))
            .await
            .unwrap();

        let (tx, source) = ChannelSource::channel(8);
        tx.send(event("a")).await.unwrap();

        let signal = async {
            while forwarder.buffered().await == 0 {
                tokio::task::yield_now().await;
            }
        };
        let report = server.run_until(Some(source), signal).await.unwrap();

        assert_eq!(report, DrainReport::Drained { delivered: 1 });
        assert_eq!(writer.types(), vec!["a"]);
        assert!(tx.send(event("late")).await.is_err());
    }

    struct FailingSource {
        failures: usize,
    }

    impl EventSource for FailingSource {
        async fn next_event(&mut self) -> anyhow::Result<Option<forwarder_common::Event>> {
            if self.failures > 0 {
                self.failures -= 1;
                anyhow::bail!("upstream unavailable");
            }
            Ok(None)
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_errors_are_retried_after_delay() {
        let forwarder = forwarder_with(CollectingWriter::default(), 10);
        let token = CancellationToken::new();
        let started = tokio::time::Instant::now();

        pump_source(
            FailingSource { failures: 2 },
            forwarder,
            Duration::from_millis(1000),
            token.clone(),
        )
        .await;

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        let forwarder = forwarder_with(CollectingWriter::default(), 10);
        let result =
            ForwarderServer::bind(forwarder, Some("not an address"), Duration::from_millis(10))
                .await;
        assert!(result.is_err());
    }
}
