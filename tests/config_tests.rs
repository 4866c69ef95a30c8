use assert_fs::prelude::*;
use server_controller::config::{Config, ServerConfig, validate_config};
use server_controller::error::{Error, Result};
use std::path::PathBuf;

const CONFIG: &str = r#"{
    "apiKeys": {
        "Survivors": "paper",
        "Survivors-Mods": "forge"
    },
    "servers": [
        {
            "server_name": "paper",
            "server_path": "/srv/minecraft/Paper",
            "jar_name": "paper-1.21.jar",
            "proxy_name": "playit"
        },
        {
            "server_name": "forge",
            "server_path": "/srv/minecraft/Forge",
            "jar_name": "forge-server.jar",
            "proxy_name": "playit"
        }
    ],
    "recordsPath": "/var/lib/controller/servers_info.json",
    "javaPath": "/usr/bin/java",
    "http": { "address": "127.0.0.1", "port": 9000, "workers": 2 }
}"#;

#[test]
fn test_parse_config() -> Result<()> {
    let config = Config::parse_from_str(CONFIG)?;

    assert_eq!(config.servers.len(), 2);
    assert_eq!(config.api_keys.len(), 2);
    assert_eq!(config.java_path, "/usr/bin/java");
    assert_eq!(config.http.address, "127.0.0.1");
    assert_eq!(config.http.port, 9000);
    assert_eq!(config.http.workers, Some(2));
    assert_eq!(
        config.records_path(),
        PathBuf::from("/var/lib/controller/servers_info.json")
    );

    let forge = config.server("forge").unwrap();
    assert_eq!(forge.jar_path(), PathBuf::from("/srv/minecraft/Forge/forge-server.jar"));
    assert_eq!(forge.proxy_path(), PathBuf::from("/srv/minecraft/Forge/playit"));

    let binding = config.credential_binding();
    assert_eq!(binding.lookup("Survivors"), Some("paper"));
    assert_eq!(binding.lookup("paper"), None);

    validate_config(&config)
}

#[test]
fn test_config_from_file() -> Result<()> {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("controller.json");
    file.write_str(CONFIG).unwrap();

    let config = Config::from_file(file.path())?;
    assert!(config.server("paper").is_some());

    Ok(())
}

#[test]
fn test_missing_file_is_parse_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let result = Config::from_file(temp.child("missing.json").path());

    assert!(matches!(result, Err(Error::ConfigParse(_))));
}

#[test]
fn test_malformed_config() {
    let result = Config::parse_from_str(r#"{"servers": []}"#);
    assert!(matches!(result, Err(Error::ConfigParse(_))));
}

#[test]
fn test_duplicate_server_names_rejected() -> Result<()> {
    let mut config = Config::parse_from_str(CONFIG)?;
    let mut duplicate = config.servers[0].clone();
    duplicate.server_path = "/elsewhere".into();
    config.servers.push(duplicate);

    assert!(matches!(validate_config(&config), Err(Error::ConfigInvalid(_))));
    Ok(())
}

#[test]
fn test_empty_fields_rejected() -> Result<()> {
    let mut config = Config::parse_from_str(CONFIG)?;
    config.servers.push(ServerConfig {
        server_name: "vanilla".to_string(),
        server_path: "/srv/minecraft/Vanilla".into(),
        jar_name: String::new(),
        proxy_name: "playit".to_string(),
    });

    assert!(matches!(validate_config(&config), Err(Error::ConfigInvalid(_))));
    Ok(())
}

#[test]
fn test_key_for_unconfigured_server_is_allowed() -> Result<()> {
    let mut config = Config::parse_from_str(CONFIG)?;
    config
        .api_keys
        .insert("Ghost".to_string(), "vanilla".to_string());

    validate_config(&config)
}
