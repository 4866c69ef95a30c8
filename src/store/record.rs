use serde::{Deserialize, Serialize};
use std::fmt;

/// Last known lifecycle state of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// A process pair was launched and has not been stopped since
    Started,
    /// No process pair is tracked
    Stopped,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStatus::Started => write!(f, "started"),
            ServerStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Persisted lifecycle state of one server.
///
/// Field names on the wire (`pid`, `proxy`, `proxy-pid`) are kept as they
/// are so existing record files stay readable.
///
/// A `Started` record always carries both pids and a `Stopped` record
/// carries neither. The pids are a snapshot: the OS may have reused them
/// since they were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Server name, unique across records
    pub server: String,
    /// Last known state
    pub status: ServerStatus,
    /// Pid of the game server process
    #[serde(rename = "pid", default)]
    pub main_pid: Option<u32>,
    /// Executable name of the companion proxy
    #[serde(rename = "proxy", default)]
    pub proxy_name: Option<String>,
    /// Pid of the companion proxy process
    #[serde(rename = "proxy-pid", default)]
    pub proxy_pid: Option<u32>,
}

impl ServerRecord {
    /// Record for a freshly launched pair
    pub fn started(server: &str, main_pid: u32, proxy_name: &str, proxy_pid: u32) -> Self {
        Self {
            server: server.to_string(),
            status: ServerStatus::Started,
            main_pid: Some(main_pid),
            proxy_name: Some(proxy_name.to_string()),
            proxy_pid: Some(proxy_pid),
        }
    }

    /// Whether the status and pid fields agree with each other
    pub fn is_consistent(&self) -> bool {
        match self.status {
            ServerStatus::Started => self.main_pid.is_some() && self.proxy_pid.is_some(),
            ServerStatus::Stopped => self.main_pid.is_none() && self.proxy_pid.is_none(),
        }
    }

    /// Apply a single field mutation
    pub fn apply(&mut self, field: &RecordField) {
        match field {
            RecordField::Status(status) => self.status = *status,
            RecordField::MainPid(pid) => self.main_pid = *pid,
            RecordField::ProxyName(name) => self.proxy_name = name.clone(),
            RecordField::ProxyPid(pid) => self.proxy_pid = *pid,
        }
    }
}

/// One mutable field of a [`ServerRecord`] with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordField {
    Status(ServerStatus),
    MainPid(Option<u32>),
    ProxyName(Option<String>),
    ProxyPid(Option<u32>),
}
