// src/server/process.rs
use crate::error::LaunchError;
use crate::server::output::{self, OutputSink, PROXY_LABEL, SERVER_LABEL};
use async_process::{Child, Command, Stdio};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use futures_lite::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Maximum JVM heap passed to every game server
pub const MAX_HEAP_FLAG: &str = "-Xmx4096M";
/// Initial JVM heap passed to every game server
pub const MIN_HEAP_FLAG: &str = "-Xms1024M";
/// Disables the game server's graphical console
pub const NO_GUI_FLAG: &str = "nogui";

/// Longest line forwarded as one item; longer runs are split into chunks
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// Merged stdout/stderr of a process, one item per line
pub type OutputStream = BoxStream<'static, io::Result<String>>;

/// Executable plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run, either a path or a name looked up in `PATH`
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Game server command: run `jar` through the `runtime` launcher with the
    /// fixed heap sizes and no GUI.
    pub fn game_server(runtime: &str, jar: &Path) -> Self {
        Self {
            program: runtime.to_string(),
            args: vec![
                MAX_HEAP_FLAG.to_string(),
                MIN_HEAP_FLAG.to_string(),
                "-jar".to_string(),
                jar.to_string_lossy().into_owned(),
                NO_GUI_FLAG.to_string(),
            ],
        }
    }

    /// Companion command: run the executable directly
    pub fn companion(executable: &Path) -> Self {
        Self::new(executable.to_string_lossy().into_owned())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Pids of a freshly launched main/companion pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessPair {
    /// Pid of the game server process
    pub main_pid: u32,
    /// Pid of the companion proxy process
    pub companion_pid: u32,
}

/// Starts process pairs.
///
/// Implementations hand each process's output to an observer before
/// returning, so the caller never has to drain pipes itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `main`, then `companion`, both in `work_dir`.
    ///
    /// If the companion fails after the main process started, the main
    /// process is left running and [`LaunchError::CompanionFailed`] names it.
    async fn launch_pair(
        &self,
        main: &CommandSpec,
        companion: &CommandSpec,
        work_dir: &Path,
    ) -> Result<ProcessPair, LaunchError>;
}

/// A process that was just spawned, with its output not yet consumed
pub struct SpawnedProcess {
    /// OS process id
    pub pid: u32,
    /// Merged stdout/stderr lines
    pub output: OutputStream,
    /// Handle used to reap the process once it exits
    pub child: Child,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess").field("pid", &self.pid).finish_non_exhaustive()
    }
}

/// Spawn one process with stdin closed and stderr merged into stdout.
pub fn spawn_process(spec: &CommandSpec, work_dir: &Path) -> Result<SpawnedProcess, LaunchError> {
    if !work_dir.is_dir() {
        return Err(LaunchError::SpawnFailed {
            program: spec.program.clone(),
            cause: format!("working directory {} does not exist", work_dir.display()),
        });
    }

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            LaunchError::ExecutableNotFound {
                program: spec.program.clone(),
            }
        } else {
            LaunchError::SpawnFailed {
                program: spec.program.clone(),
                cause: e.to_string(),
            }
        }
    })?;

    let pid = child.id();
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(LaunchError::SpawnFailed {
            program: spec.program.clone(),
            cause: "failed to capture output pipes".to_string(),
        });
    };

    tracing::debug!(pid = pid, command = %spec, "Spawned process");

    Ok(SpawnedProcess {
        pid,
        output: stream::select(line_stream(stdout), line_stream(stderr)).boxed(),
        child,
    })
}

/// Lines of `reader`, decoded lossily so stray non-UTF-8 bytes don't end the stream.
///
/// A line longer than [`MAX_LINE_BYTES`] comes out as several items.
fn line_stream<R>(reader: R) -> OutputStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(Some(BufReader::new(reader)), |state| async move {
        let Some(mut reader) = state else {
            return None;
        };
        let mut buf = Vec::with_capacity(256);

        let read = (&mut reader).take(MAX_LINE_BYTES).read_until(b'\n', &mut buf).await;

        match read {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                Some((Ok(line), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

/// Launches real OS processes and forwards their output to a sink.
pub struct SystemLauncher {
    sink: Arc<dyn OutputSink>,
}

impl SystemLauncher {
    /// Create a launcher forwarding output to `sink`
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn launch_pair(
        &self,
        main: &CommandSpec,
        companion: &CommandSpec,
        work_dir: &Path,
    ) -> Result<ProcessPair, LaunchError> {
        let main_process = spawn_process(main, work_dir)?;
        let main_pid = main_process.pid;
        // Drain main output right away; it keeps running even if the companion fails
        output::forward_output(SERVER_LABEL, main_process, self.sink.clone());

        let companion_process = spawn_process(companion, work_dir).map_err(|e| {
            tracing::warn!(
                main_pid = main_pid,
                error = %e,
                "Companion failed to start, main process left running"
            );
            LaunchError::CompanionFailed {
                main_pid,
                source: Box::new(e),
            }
        })?;
        let companion_pid = companion_process.pid;
        output::forward_output(PROXY_LABEL, companion_process, self.sink.clone());

        Ok(ProcessPair {
            main_pid,
            companion_pid,
        })
    }
}
