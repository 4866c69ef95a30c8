//! Forwarding of process output to an observer.
//!
//! Each launched process gets one background task that reads its merged
//! stdout/stderr line stream and hands every line to an [`OutputSink`].
//! Tasks are never joined or cancelled: they end on their own once the
//! process closes its output. A process that outlives the controller's
//! interest (for example one orphaned by a repeated start) keeps its task
//! alive until it exits.

use crate::server::process::{OutputStream, SpawnedProcess};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Label for lines coming from the game server process
pub const SERVER_LABEL: &str = "[SERVER]";
/// Label for lines coming from the companion proxy process
pub const PROXY_LABEL: &str = "[PROXY]";

/// Receives output lines from launched processes.
///
/// Implementations must not block; they are called from async tasks.
pub trait OutputSink: Send + Sync {
    /// Handle one line (without its trailing newline)
    fn forward(&self, label: &str, pid: u32, line: &str);
}

/// Sink that emits every line as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn forward(&self, label: &str, pid: u32, line: &str) {
        tracing::info!(target: "server_output", pid = pid, "{} {}", label, line);
    }
}

/// Forward every line of `output` to `sink` on a background task.
pub fn forward_lines(
    label: &'static str,
    pid: u32,
    mut output: OutputStream,
    sink: Arc<dyn OutputSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = output.next().await {
            match line {
                Ok(line) => sink.forward(label, pid, &line),
                Err(e) => {
                    tracing::debug!(pid = pid, label = label, error = %e, "Output reader exiting due to read error");
                    break;
                }
            }
        }

        tracing::debug!(pid = pid, label = label, "Output stream closed");
    })
}

/// Forward a spawned process's output, then reap it and log how it exited.
pub fn forward_output(
    label: &'static str,
    process: SpawnedProcess,
    sink: Arc<dyn OutputSink>,
) -> JoinHandle<()> {
    let SpawnedProcess {
        pid,
        output,
        mut child,
    } = process;

    tokio::spawn(async move {
        if let Err(e) = forward_lines(label, pid, output, sink).await {
            tracing::warn!(pid = pid, error = %e, "Output forwarder panicked");
        }

        match child.status().await {
            Ok(status) => tracing::info!(pid = pid, label = label, status = %status, "Process exited"),
            Err(e) => tracing::warn!(pid = pid, label = label, error = %e, "Failed to collect exit status"),
        }
    })
}
