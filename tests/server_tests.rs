#![cfg(unix)]

mod common;

use common::{eventually, runnable_config};
use server_controller::error::{AuthError, Error, LaunchError};
use server_controller::server::{OutputSink, SystemLauncher, pid_exists, terminate};
use server_controller::{ServerController, ServerStatus, StatusResponse};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    lines: Mutex<Vec<(String, u32, String)>>,
}

impl CollectingSink {
    fn contains(&self, label: &str, pid: u32, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(l, p, line)| l == label && *p == pid && line.contains(needle))
    }
}

impl OutputSink for CollectingSink {
    fn forward(&self, label: &str, pid: u32, line: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((label.to_string(), pid, line.to_string()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_status_stop_scenario() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let controller = ServerController::new(runnable_config(&dir))?;

    assert_eq!(controller.status("paper").await?, None);

    let record = controller.start("paper", "Survivors").await?;
    assert_eq!(record.status, ServerStatus::Started);
    assert_eq!(record.proxy_name.as_deref(), Some("playit"));
    let main_pid = record.main_pid.expect("main pid recorded");
    let proxy_pid = record.proxy_pid.expect("proxy pid recorded");
    assert!(pid_exists(main_pid));
    assert!(pid_exists(proxy_pid));

    assert_eq!(
        controller.status("paper").await?,
        Some(StatusResponse {
            status: ServerStatus::Started
        })
    );

    let stopped = controller.stop("paper", "Survivors").await?.unwrap();
    assert_eq!(stopped.status, ServerStatus::Started);
    assert_eq!(stopped.server, "paper");

    assert_eq!(
        controller.status("paper").await?,
        Some(StatusResponse {
            status: ServerStatus::Stopped
        })
    );
    let record = controller.store().find("paper").await?.unwrap();
    assert_eq!(record.main_pid, None);
    assert_eq!(record.proxy_pid, None);

    // Killed children are reaped by their forwarder tasks
    assert!(eventually(|| !pid_exists(main_pid) && !pid_exists(proxy_pid)).await);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mismatched_key_writes_nothing() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = runnable_config(&dir);
    let records_path = config.records_path.clone();
    let controller = ServerController::new(config)?;

    let err = controller.start("paper", "Survivors-Mods").await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::ServerMismatch { .. })));

    assert_eq!(controller.status("paper").await?, None);
    assert!(!records_path.exists());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_after_processes_died() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let controller = ServerController::new(runnable_config(&dir))?;

    let record = controller.start("forge", "Survivors-Mods").await?;
    let main_pid = record.main_pid.unwrap();
    let proxy_pid = record.proxy_pid.unwrap();

    // Both die behind the controller's back
    terminate(main_pid).unwrap();
    terminate(proxy_pid).unwrap();
    assert!(eventually(|| !pid_exists(main_pid) && !pid_exists(proxy_pid)).await);

    let stopped = controller.stop("forge", "Survivors-Mods").await?.unwrap();
    assert_eq!(stopped.status, ServerStatus::Started);

    let record = controller.store().find("forge").await?.unwrap();
    assert!(record.is_consistent());
    assert_eq!(record.status, ServerStatus::Stopped);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_output_is_forwarded_with_labels() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(CollectingSink::default());
    let launcher = Arc::new(SystemLauncher::new(sink.clone()));
    let controller = ServerController::with_launcher(runnable_config(&dir), launcher)?;

    let record = controller.start("paper", "Survivors").await?;
    let main_pid = record.main_pid.unwrap();
    let proxy_pid = record.proxy_pid.unwrap();

    assert!(eventually(|| sink.contains("[SERVER]", main_pid, "-Xmx4096M -Xms1024M -jar")).await);
    assert!(eventually(|| sink.contains("[SERVER]", main_pid, "nogui")).await);
    // The proxy writes to stderr, which is merged into its output
    assert!(eventually(|| sink.contains("[PROXY]", proxy_pid, "proxy up")).await);

    controller.stop("paper", "Survivors").await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_proxy_leaves_main_running() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = runnable_config(&dir);
    std::fs::remove_file(config.server("paper").unwrap().proxy_path()).unwrap();
    let controller = ServerController::new(config)?;

    let err = controller.start("paper", "Survivors").await.unwrap_err();
    let (main_pid, source) = match err {
        Error::LaunchFailed(LaunchError::CompanionFailed { main_pid, source }) => (main_pid, source),
        other => panic!("expected a companion failure, got {:?}", other),
    };
    assert!(matches!(*source, LaunchError::ExecutableNotFound { .. }));

    assert!(pid_exists(main_pid));
    assert_eq!(controller.status("paper").await?, None);

    terminate(main_pid).unwrap();
    assert!(eventually(|| !pid_exists(main_pid)).await);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_runtime_is_reported() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let mut config = runnable_config(&dir);
    config.java_path = dir.path().join("no-such-java").to_string_lossy().into_owned();
    let controller = ServerController::new(config)?;

    let err = controller.start("paper", "Survivors").await.unwrap_err();
    assert!(matches!(
        err,
        Error::LaunchFailed(LaunchError::ExecutableNotFound { .. })
    ));
    assert_eq!(controller.status("paper").await?, None);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_records_survive_controller_restart() -> server_controller::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = runnable_config(&dir);

    let first = ServerController::new(config.clone())?;
    let record = first.start("paper", "Survivors").await?;
    drop(first);

    // A fresh controller only knows what the record file says
    let second = ServerController::new(config)?;
    assert_eq!(
        second.status("paper").await?,
        Some(StatusResponse {
            status: ServerStatus::Started
        })
    );

    second.stop("paper", "Survivors").await?;
    let main_pid = record.main_pid.unwrap();
    assert!(eventually(|| !pid_exists(main_pid)).await);

    Ok(())
}
