use super::EventSource;
use anyhow::{Context, Result};
use forwarder_common::event::Event;
use std::io::{self, BufRead};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const LINE_CHANNEL_CAPACITY: usize = 256;

/// Newline delimited JSON events read from any buffered reader.
///
/// The reader runs on its own OS thread and hands lines over a channel, so a
/// read that never returns cannot keep the runtime alive at shutdown. A
/// malformed line is rejected on its own and skipped. End of input exhausts
/// the source.
pub struct LineSource {
    lines: mpsc::Receiver<io::Result<String>>,
    line_number: usize,
}

pub type StdinSource = LineSource;

impl LineSource {
    pub fn stdin() -> Result<Self> {
        Self::spawn(io::BufReader::new(io::stdin()))
    }

    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Result<Self> {
        let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        std::thread::Builder::new()
            .name("line-reader".to_string())
            .spawn(move || read_lines(reader, tx))
            .context("Failed to spawn line reader thread")?;

        Ok(LineSource {
            lines: rx,
            line_number: 0,
        })
    }
}

fn read_lines<R: BufRead>(reader: R, tx: mpsc::Sender<io::Result<String>>) {
    for line in reader.lines() {
        let failed = line.is_err();
        // a closed channel means the source was dropped
        if tx.blocking_send(line).is_err() || failed {
            break;
        }
    }
    debug!("Line reader finished");
}

impl EventSource for LineSource {
    async fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            let Some(line) = self.lines.recv().await else {
                return Ok(None);
            };
            let line = line.context("failed to read event line")?;
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Event::from_json(line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!("Skipping line {}: {}", self.line_number, e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "stdin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::time::Duration;

    /// Blocks every read until the paired sender is dropped.
    struct StalledReader(std::sync::mpsc::Receiver<()>);

    impl Read for StalledReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_reads_events_and_skips_bad_lines() {
        let input = Cursor::new(
            b"{\"type\":\"a\",\"properties\":{\"n\":1}}\n\
            \n\
            not json\n\
            {\"properties\":{}}\n\
            {\"type\":\"b\"}\n"
                .to_vec(),
        );
        let mut source = LineSource::spawn(input).unwrap();

        let first = source.next_event().await.unwrap().unwrap();
        assert_eq!(first.event_type, "a");
        assert_eq!(first.properties["n"], 1);

        let second = source.next_event().await.unwrap().unwrap();
        assert_eq!(second.event_type, "b");

        assert!(source.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_input_is_exhausted() {
        let mut source = LineSource::spawn(Cursor::new(Vec::new())).unwrap();
        assert!(source.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_error_is_reported() {
        // invalid UTF-8 fails `lines()`
        let mut source = LineSource::spawn(Cursor::new(vec![0xff, 0xfe, b'\n'])).unwrap();
        assert!(source.next_event().await.is_err());
        assert!(source.next_event().await.unwrap().is_none());
    }

    #[test]
    fn test_stalled_reader_does_not_block_runtime_drop() {
        let (_hold, stalled) = std::sync::mpsc::channel::<()>();
        let reader = io::BufReader::new(StalledReader(stalled));
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let mut source = LineSource::spawn(reader).unwrap();
                let waited =
                    tokio::time::timeout(Duration::from_millis(50), source.next_event()).await;
                assert!(waited.is_err());
            });
            drop(runtime);
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("runtime drop waited on the blocked reader");
    }
}
