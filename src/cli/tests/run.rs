#![cfg(unix)]

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(10);

fn wait_for_line(lines: &mpsc::Receiver<String>, needle: &str) {
    let deadline = Instant::now() + WAIT;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match lines.recv_timeout(left) {
            Ok(line) if line.contains(needle) => return,
            Ok(_) => {}
            Err(_) => break,
        }
    }
    panic!("no log line containing `{}`", needle);
}

#[test]
fn test_run_exits_on_sigterm_while_stdin_stays_open() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_forwarder"))
        .arg("run")
        .env_remove("FORWARDER_CONFIG")
        .env("FORWARDER_SERVER", "")
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // never written to or closed, so the stdin source never sees EOF
    let _stdin = child.stdin.take().unwrap();

    let stderr = child.stderr.take().unwrap();
    let (tx, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    wait_for_line(&lines, "Reading events from stdin source");
    thread::sleep(Duration::from_millis(200));

    let kill = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let deadline = Instant::now() + WAIT;
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("forwarder still running {:?} after SIGTERM", WAIT);
        }
        thread::sleep(Duration::from_millis(50));
    };

    // a signal exit would mean the handler never ran
    assert!(exit.success(), "unexpected exit status: {:?}", exit);
    wait_for_line(&lines, "Received SIGTERM");
}
