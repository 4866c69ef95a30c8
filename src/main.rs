use server_controller::{ServerController, http};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "SERVER_CONTROLLER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "controller.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    info!(config = %config_path, "Starting server controller");

    // A corrupt record store aborts here rather than guessing at process state
    let controller = Arc::new(ServerController::from_config_file(&config_path)?);
    let http_config = controller.config().http.clone();

    http::serve(controller, &http_config).await?;
    Ok(())
}
