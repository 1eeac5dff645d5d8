//! Operator interface: console commands and OS signals
//!
//! Typing `q`, `quit`, `s` or `stop` (any case) on stdin, or sending SIGHUP,
//! SIGTERM or SIGINT, requests shutdown.

use crate::crawler::ShutdownHandle;
use std::io::BufRead;

const STOP_COMMANDS: &[&str] = &["q", "quit", "s", "stop"];

/// Returns true if the console line asks the crawl to stop
pub fn is_stop_command(line: &str) -> bool {
    let line = line.trim();
    STOP_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}

/// Reads lines until a stop command or end of input
///
/// Returns true if shutdown was requested.
pub fn watch_lines<R: BufRead>(reader: R, handle: &ShutdownHandle) -> bool {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Console read failed");
                return false;
            }
        };

        if is_stop_command(&line) {
            handle.request();
            return true;
        }

        if !line.trim().is_empty() {
            tracing::info!(command = %line.trim(), "Unknown console command (use q, quit, s or stop)");
        }
    }
    false
}

/// Watches stdin on a background thread
///
/// The thread blocks on stdin and is not joined; it ends with the process.
pub fn spawn_console(handle: ShutdownHandle) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("crawly-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            watch_lines(stdin.lock(), &handle);
        })
}

/// Requests shutdown on the first SIGHUP, SIGTERM or SIGINT
#[cfg(unix)]
pub async fn watch_signals(handle: ShutdownHandle) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = hangup.recv() => "SIGHUP",
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
        _ = handle.requested() => return Ok(()),
    };

    tracing::info!(signal = name, "Received signal");
    handle.request();
    Ok(())
}

/// Requests shutdown on Ctrl-C
#[cfg(not(unix))]
pub async fn watch_signals(handle: ShutdownHandle) -> std::io::Result<()> {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!(signal = "ctrl-c", "Received signal");
            handle.request();
        }
        _ = handle.requested() => {}
    }
    Ok(())
}
