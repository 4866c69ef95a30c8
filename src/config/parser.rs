use crate::auth::CredentialBinding;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default number of Actix Web workers
pub const DEFAULT_WORKERS: usize = 4;

/// Static definition of one game server.
///
/// Mirrors an entry of the `servers` array in the controller configuration.
/// The install directory may start with `~`, which is expanded against the
/// current user's home directory.
///
/// # Examples
///
/// ```
/// use server_controller::config::ServerConfig;
///
/// let server = ServerConfig {
///     server_name: "paper".to_string(),
///     server_path: "/srv/minecraft/paper".into(),
///     jar_name: "paper.jar".to_string(),
///     proxy_name: "playit".to_string(),
/// };
///
/// assert_eq!(server.jar_path().to_str(), Some("/srv/minecraft/paper/paper.jar"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Logical server name used in URLs and API key bindings.
    pub server_name: String,

    /// Install directory; also the working directory of both processes.
    pub server_path: PathBuf,

    /// Jar file of the game server, relative to `server_path`.
    pub jar_name: String,

    /// Executable of the companion proxy, relative to `server_path`.
    pub proxy_name: String,
}

impl ServerConfig {
    /// Install directory with a leading `~` expanded.
    pub fn install_dir(&self) -> PathBuf {
        expand_home(&self.server_path)
    }

    /// Full path of the server jar.
    pub fn jar_path(&self) -> PathBuf {
        self.install_dir().join(&self.jar_name)
    }

    /// Full path of the companion executable.
    pub fn proxy_path(&self) -> PathBuf {
        self.install_dir().join(&self.proxy_name)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of Actix Web workers, `DEFAULT_WORKERS` when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_records_path() -> PathBuf {
    PathBuf::from("servers_info.json")
}

fn default_java_path() -> String {
    "java".to_string()
}

/// Main configuration for the controller.
///
/// # JSON Schema
///
/// ```json
/// {
///   "apiKeys": {
///     "Survivors": "paper",
///     "Survivors-Mods": "forge"
///   },
///   "servers": [
///     {
///       "server_name": "paper",
///       "server_path": "~/servers/paper",
///       "jar_name": "paper.jar",
///       "proxy_name": "playit"
///     }
///   ],
///   "recordsPath": "servers_info.json",
///   "javaPath": "java",
///   "http": { "address": "0.0.0.0", "port": 8000 }
/// }
/// ```
///
/// Every key except `apiKeys` and `servers` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key to the single server it controls.
    #[serde(rename = "apiKeys")]
    pub api_keys: HashMap<String, String>,

    /// Server definitions, in listing order.
    pub servers: Vec<ServerConfig>,

    /// Location of the persisted lifecycle records.
    #[serde(rename = "recordsPath", default = "default_records_path")]
    pub records_path: PathBuf,

    /// Runtime launcher used to run server jars.
    #[serde(rename = "javaPath", default = "default_java_path")]
    pub java_path: String,

    /// HTTP listener settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a JSON string.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Looks up a server definition by name.
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.server_name == name)
    }

    /// Builds the immutable credential table from `apiKeys`.
    pub fn credential_binding(&self) -> CredentialBinding {
        CredentialBinding::new(self.api_keys.clone())
    }

    /// Records path with a leading `~` expanded.
    pub fn records_path(&self) -> PathBuf {
        expand_home(&self.records_path)
    }
}

/// Expands a leading `~` to the home directory. Paths without one, or
/// systems without a home directory, are returned unchanged.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match home::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
