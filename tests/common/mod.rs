// Shared fixtures for the integration tests.
#![allow(dead_code)]

use server_controller::Config;
use server_controller::config::{HttpConfig, ServerConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Controller config rooted in `dir`, with two servers and three keys.
///
/// `Ghost` is bound to a server that is not configured.
pub fn test_config(dir: &Path) -> Config {
    let server = |name: &str| ServerConfig {
        server_name: name.to_string(),
        server_path: dir.join(name),
        jar_name: format!("{}.jar", name),
        proxy_name: "playit".to_string(),
    };

    Config {
        api_keys: HashMap::from([
            ("Survivors".to_string(), "paper".to_string()),
            ("Survivors-Mods".to_string(), "forge".to_string()),
            ("Ghost".to_string(), "vanilla".to_string()),
        ]),
        servers: vec![server("paper"), server("forge")],
        records_path: dir.join("servers_info.json"),
        java_path: "java".to_string(),
        http: HttpConfig::default(),
    }
}

/// Write an executable shell script
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Lay out install directories whose "java" and proxy are long-running
/// shell scripts, and point the config at them.
///
/// The fake runtime echoes its arguments; the proxy writes to stderr.
#[cfg(unix)]
pub fn runnable_config(dir: &TempDir) -> Config {
    let mut config = test_config(dir.path());

    let java = dir.path().join("bin").join("java");
    write_script(&java, "echo \"runtime $@\"\nexec sleep 30");
    config.java_path = java.to_string_lossy().into_owned();

    for server in &config.servers {
        let install_dir = server.install_dir();
        std::fs::create_dir_all(&install_dir).unwrap();
        std::fs::write(server.jar_path(), b"not really a jar").unwrap();
        write_script(&server.proxy_path(), "echo proxy up 1>&2\nexec sleep 30");
    }

    config
}

/// Poll `check` until it holds or five seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    check()
}

pub fn records_path(dir: &TempDir) -> PathBuf {
    dir.path().join("servers_info.json")
}
