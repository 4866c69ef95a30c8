//! Configuration module for the server controller.
//!
//! This module handles parsing, validation, and access to the controller
//! configuration: the server definitions, the API key table, where lifecycle
//! records are persisted and how the HTTP listener binds.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use server_controller::config::{Config, validate_config};
//!
//! let config = Config::from_file("controller.json").unwrap();
//! validate_config(&config).unwrap();
//! println!("Loaded configuration with {} servers", config.servers.len());
//! ```
mod parser;
pub mod validator;

pub use parser::{Config, DEFAULT_WORKERS, HttpConfig, ServerConfig};
pub use validator::validate_config;
