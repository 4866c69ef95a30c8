//! Forceful termination of recorded processes.
//!
//! Pids come from the record store, so the process may already be gone (or
//! the pid may belong to something else by now). A missing process is an
//! expected outcome, not an error.

use std::io;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Outcome of a termination attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The kill signal was delivered
    Killed,
    /// No process with that pid existed
    AlreadyGone,
}

/// Send SIGKILL to `pid`.
///
/// # Returns
/// - `Ok(Termination::Killed)` if the signal was delivered
/// - `Ok(Termination::AlreadyGone)` if no such process exists (ESRCH)
/// - `Err` for any other failure, e.g. EPERM
pub fn terminate(pid: u32) -> io::Result<Termination> {
    #[cfg(unix)]
    {
        terminate_unix(pid)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process termination not implemented on this platform",
        ))
    }
}

#[cfg(unix)]
fn terminate_unix(pid: u32) -> io::Result<Termination> {
    let nix_pid = to_nix_pid(pid)?;

    match signal::kill(nix_pid, Signal::SIGKILL) {
        Ok(()) => Ok(Termination::Killed),
        Err(Errno::ESRCH) => Ok(Termination::AlreadyGone),
        Err(e) => Err(io::Error::from(e)),
    }
}

/// Check if a pid exists, without sending it anything.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    let Ok(nix_pid) = to_nix_pid(pid) else {
        return false;
    };

    match signal::kill(nix_pid, None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        // Exists, but belongs to someone we can't signal
        Err(_) => true,
    }
}

#[cfg(not(unix))]
pub fn pid_exists(_pid: u32) -> bool {
    false
}

// Pid 0 and negative pids address process groups, never a single process
#[cfg(unix)]
fn to_nix_pid(pid: u32) -> io::Result<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a valid process id", pid),
        )),
    }
}
