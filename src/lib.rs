/*!
 # Server Controller

 Remote start/stop/status control for game servers that run as a pair of OS
 processes: the game server itself and a companion network proxy.

 ## Overview

 Server Controller provides functionality to:
 - Start a server's process pair and record their pids
 - Stop both processes together, tolerating ones that already died
 - Answer status queries from persisted records, across controller restarts
 - Restrict control of each server to the API key bound to it
 - Optionally serve all of the above over HTTP

 ## Basic Usage

 ```no_run
 use server_controller::{ServerController, Result};

 #[tokio::main]
 async fn main() -> Result<()> {
     let controller = ServerController::from_config_file("controller.json")?;

     let record = controller.start("paper", "Survivors").await?;
     println!("Started paper: pid {:?}, proxy pid {:?}", record.main_pid, record.proxy_pid);

     if let Some(status) = controller.status("paper").await? {
         println!("paper is {}", status.status);
     }

     controller.stop("paper", "Survivors").await?;
     Ok(())
 }
 ```

 ## Features

 - **Stateless supervision**: everything known about running processes lives
   in a JSON record file written atomically
 - **Per-server API keys**: a key controls exactly one server
 - **Output forwarding**: process output is streamed to `tracing` (or any
   [`server::OutputSink`]) in the background
 - **HTTP API**: Actix Web routes for status, start, stop and server listing
*/

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{ServerRecord, ServerStatus};
pub use types::{StatusResponse, StopResult};

use auth::AuthGate;
use config::ServerConfig;
use server::signal::{self, Termination};
use server::{CommandSpec, ProcessLauncher, SystemLauncher, TracingSink};
use std::path::Path;
use std::sync::Arc;
use store::{RecordField, RecordStore};

/// Starts, stops and reports on configured servers.
///
/// The controller holds no process state of its own. Every operation reads
/// the record store, and start/stop write the outcome back once it is known.
/// It is shared between request handlers behind an `Arc`; all operations
/// take `&self`.
/// All public methods are instrumented with `tracing` spans.
pub struct ServerController {
    /// Configuration
    config: Config,
    /// API key checks
    gate: AuthGate,
    /// Persisted lifecycle records
    store: RecordStore,
    /// Spawns process pairs
    launcher: Arc<dyn ProcessLauncher>,
}

impl ServerController {
    /// Create a controller from a configuration file path
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(path), fields(config_path = ?path.as_ref()))]
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        Self::new(config)
    }

    /// Create a controller that launches real processes and logs their output
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the record store exists but
    /// is corrupt. A corrupt store means prior process state is unknown, so
    /// this is meant to stop the controller from starting at all.
    pub fn new(config: Config) -> Result<Self> {
        let launcher = Arc::new(SystemLauncher::new(Arc::new(TracingSink)));
        Self::with_launcher(config, launcher)
    }

    /// Create a controller with a custom process launcher
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip_all, fields(num_servers = config.servers.len()))]
    pub fn with_launcher(config: Config, launcher: Arc<dyn ProcessLauncher>) -> Result<Self> {
        config::validate_config(&config)?;

        let store = RecordStore::open(config.records_path())?;
        let gate = AuthGate::new(config.credential_binding());

        tracing::info!("Creating new ServerController");
        Ok(Self {
            config,
            gate,
            store,
            launcher,
        })
    }

    /// The loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The record store backing this controller
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Configured servers, in configuration order
    pub fn list_servers(&self) -> &[ServerConfig] {
        &self.config.servers
    }

    /// Last known status of `server`.
    ///
    /// Returns `None` for a server that was never started. No API key is needed.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server = %server))]
    pub async fn status(&self, server: &str) -> Result<Option<StatusResponse>> {
        tracing::debug!("Getting server status");
        let record = self.store.find(server).await?;

        Ok(record.map(|r| StatusResponse { status: r.status }))
    }

    /// Start the process pair of `server`.
    ///
    /// Starting a server that is already started launches a second pair and
    /// points the record at it; the earlier pair keeps running untracked.
    ///
    /// # Errors
    ///
    /// * [`Error::Auth`] if `credential` does not control `server`
    /// * [`Error::ServerNotFound`] if `server` is not configured
    /// * [`Error::LaunchFailed`] if either process fails to spawn; nothing is
    ///   recorded in that case
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, credential), fields(server = %server))]
    pub async fn start(&self, server: &str, credential: &str) -> Result<ServerRecord> {
        self.gate.authorize(server, credential)?;

        let server_config = self.config.server(server).ok_or_else(|| {
            tracing::error!("Configuration not found for server");
            Error::ServerNotFound(server.to_string())
        })?;

        if let Some(previous) = self.store.find(server).await? {
            if previous.status == ServerStatus::Started {
                tracing::warn!(
                    old_pid = ?previous.main_pid,
                    old_proxy_pid = ?previous.proxy_pid,
                    "Server already started, previous processes will no longer be tracked"
                );
            }
        }

        let work_dir = server_config.install_dir();
        let main = CommandSpec::game_server(&self.config.java_path, &server_config.jar_path());
        let companion = CommandSpec::companion(&server_config.proxy_path());

        tracing::info!(work_dir = %work_dir.display(), "Attempting to start server");
        let pair = self
            .launcher
            .launch_pair(&main, &companion, &work_dir)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to launch server processes");
                e
            })?;

        let record = ServerRecord::started(
            server,
            pair.main_pid,
            &server_config.proxy_name,
            pair.companion_pid,
        );
        self.store.upsert(record.clone()).await?;

        tracing::info!(
            pid = pair.main_pid,
            proxy_pid = pair.companion_pid,
            "Server started successfully"
        );
        Ok(record)
    }

    /// Stop the process pair of `server`.
    ///
    /// Both recorded pids get SIGKILL. A process that no longer exists is
    /// fine; any other signal failure is logged and the stop carries on. The
    /// record always ends up stopped with no pids, even if it already was.
    ///
    /// Returns `None` for a server that was never started, otherwise the
    /// status it had before this call.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, credential), fields(server = %server))]
    pub async fn stop(&self, server: &str, credential: &str) -> Result<Option<StopResult>> {
        self.gate.authorize(server, credential)?;

        let Some(record) = self.store.find(server).await? else {
            tracing::debug!("No record for server, nothing to stop");
            return Ok(None);
        };

        if record.status == ServerStatus::Started {
            tracing::info!("Attempting to stop server");
            kill_recorded("server", record.main_pid);
            kill_recorded("proxy", record.proxy_pid);
        } else {
            tracing::debug!("Server already stopped");
        }

        self.store
            .update_fields(
                server,
                &[
                    RecordField::Status(ServerStatus::Stopped),
                    RecordField::MainPid(None),
                    RecordField::ProxyPid(None),
                ],
            )
            .await?;

        tracing::info!("Server stopped");
        Ok(Some(StopResult {
            status: record.status,
            server: record.server,
        }))
    }
}

fn kill_recorded(role: &str, pid: Option<u32>) {
    let Some(pid) = pid else {
        tracing::warn!(role = role, "Started record has no pid");
        return;
    };

    match signal::terminate(pid) {
        Ok(Termination::Killed) => tracing::debug!(role = role, pid = pid, "Sent SIGKILL"),
        Ok(Termination::AlreadyGone) => {
            tracing::debug!(role = role, pid = pid, "Process already gone")
        }
        Err(e) => tracing::error!(role = role, pid = pid, error = %e, "Failed to kill process"),
    }
}
