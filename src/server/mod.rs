/// Process management for the controller.
///
/// This module spawns game-server/proxy pairs, forwards their output and
/// terminates them by pid.
///
/// # Components
///
/// * `process` - Command construction, spawning and the [`ProcessLauncher`] seam
/// * `output` - Background forwarding of process output to an [`OutputSink`]
/// * `signal` - Forceful termination tolerant of already-dead processes
///
/// # Examples
///
/// Launching a pair:
///
/// ```no_run
/// use server_controller::server::{CommandSpec, ProcessLauncher, SystemLauncher, TracingSink};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), server_controller::error::LaunchError> {
/// let launcher = SystemLauncher::new(Arc::new(TracingSink));
/// let dir = Path::new("/srv/minecraft/paper");
/// let main = CommandSpec::game_server("java", &dir.join("paper.jar"));
/// let proxy = CommandSpec::companion(&dir.join("playit"));
///
/// let pair = launcher.launch_pair(&main, &proxy, dir).await?;
/// println!("server pid {}, proxy pid {}", pair.main_pid, pair.companion_pid);
/// # Ok(())
/// # }
/// ```
pub mod output;
pub mod process;
pub mod signal;

pub use output::{OutputSink, TracingSink};
pub use process::{CommandSpec, ProcessLauncher, ProcessPair, SpawnedProcess, SystemLauncher};
pub use signal::{Termination, pid_exists, terminate};
