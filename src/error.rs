/// Error handling module for the server controller.
///
/// This module defines the error types used throughout the library. Errors
/// fall into three classes that callers need to tell apart: the caller is
/// not authorized ([`AuthError`]), the requested server does not exist
/// ([`Error::ServerNotFound`]), or an operation failed at the OS or storage
/// level (everything else).
///
/// # Example
///
/// ```
/// use server_controller::error::{AuthError, Error, Result};
///
/// fn describe(result: Result<()>) -> String {
///     match result {
///         Ok(_) => "ok".to_string(),
///         Err(Error::Auth(AuthError::ServerMismatch { bound_server, .. })) => {
///             format!("key belongs to '{}'", bound_server)
///         }
///         Err(Error::ServerNotFound(name)) => format!("no server named '{}'", name),
///         Err(e) => format!("failed: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Authorization failures raised by the credential gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no credential at all.
    #[error("Missing API key")]
    MissingCredential,

    /// The credential is not bound to any server.
    #[error("Unknown API key")]
    UnknownCredential,

    /// The credential is valid but controls a different server.
    ///
    /// This error occurs when:
    /// - A key bound to `bound_server` is used against `claimed_server`
    #[error(
        "API key does not match the server: key controls '{bound_server}' but was used for '{claimed_server}'"
    )]
    ServerMismatch {
        /// Server the credential is bound to
        bound_server: String,
        /// Server the caller tried to control
        claimed_server: String,
    },
}

/// Failures while spawning a process pair.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The executable could not be found on disk or in `PATH`.
    #[error("Executable not found: {program}")]
    ExecutableNotFound {
        /// Program that was invoked
        program: String,
    },

    /// The OS refused to spawn the process for any other reason.
    #[error("Failed to spawn {program}: {cause}")]
    SpawnFailed {
        /// Program that was invoked
        program: String,
        /// OS level reason
        cause: String,
    },

    /// The main process started but the companion did not.
    ///
    /// The main process is left running; `main_pid` identifies it so an
    /// operator can clean it up.
    #[error("Companion process failed after main process {main_pid} started: {source}")]
    CompanionFailed {
        /// Pid of the main process that is still running
        main_pid: u32,
        /// Why the companion failed
        #[source]
        source: Box<LaunchError>,
    },
}

/// Errors that can occur in the server controller.
///
/// Each variant includes context information to help diagnose and handle
/// the error appropriately.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller is not allowed to control the requested server.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Requested server was not found in the configuration.
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    /// Spawning the process pair failed.
    #[error("Failed to launch server: {0}")]
    LaunchFailed(#[from] LaunchError),

    /// The record store exists but cannot be parsed.
    ///
    /// This error occurs when:
    /// - The records file is not valid JSON
    /// - A record has fields of the wrong type
    #[error("Record store is corrupt: {0}")]
    StoreCorrupt(String),

    /// The record store could not be read or written.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    /// Failed to parse configuration from a file or string.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration parsed but contains invalid values.
    ///
    /// This error occurs when:
    /// - A server definition has an empty field
    /// - Two servers share a name
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for server controller operations.
pub type Result<T> = std::result::Result<T, Error>;
