use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validates a single server definition
pub fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.server_name.is_empty() {
        return Err(Error::ConfigInvalid("Server has empty name".to_string()));
    }

    let name = &config.server_name;
    if config.server_path.as_os_str().is_empty() {
        return Err(Error::ConfigInvalid(format!("Server '{}' has empty server_path", name)));
    }
    if config.jar_name.is_empty() {
        return Err(Error::ConfigInvalid(format!("Server '{}' has empty jar_name", name)));
    }
    if config.proxy_name.is_empty() {
        return Err(Error::ConfigInvalid(format!("Server '{}' has empty proxy_name", name)));
    }

    Ok(())
}

/// Validates the list of server definitions
pub fn validate_server_configs(configs: &[ServerConfig]) -> Result<()> {
    let mut seen = HashSet::new();

    for config in configs {
        validate_server_config(config)?;

        if !seen.insert(config.server_name.as_str()) {
            return Err(Error::ConfigInvalid(format!(
                "Server '{}' is defined more than once",
                config.server_name
            )));
        }
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server_configs(&config.servers)?;

    for (key, server) in &config.api_keys {
        if key.is_empty() {
            return Err(Error::ConfigInvalid("Empty API key".to_string()));
        }
        // Starting such a server answers "not found", so this is not fatal
        if config.server(server).is_none() {
            tracing::warn!(server = %server, "API key is bound to a server that is not configured");
        }
    }

    if config.java_path.is_empty() {
        return Err(Error::ConfigInvalid("javaPath is empty".to_string()));
    }

    Ok(())
}
