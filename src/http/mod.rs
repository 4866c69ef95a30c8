//! HTTP API for the controller using Actix Web.
//!
//! Every route maps onto exactly one [`ServerController`] operation. The
//! controller is shared between workers as `Data<Arc<ServerController>>`.
//!
//! # Examples
//!
//! ```no_run
//! use server_controller::{ServerController, http};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> server_controller::Result<()> {
//!     let controller = Arc::new(ServerController::from_config_file("controller.json")?);
//!     let http_config = controller.config().http.clone();
//!     http::serve(controller, &http_config).await
//! }
//! ```

pub mod actix_error;
pub mod handlers;

use crate::ServerController;
use crate::config::{DEFAULT_WORKERS, HttpConfig};
use crate::error::{Error, Result};

use actix_cors::Cors;
use actix_web::{
    App, HttpServer, middleware,
    web::{self, Data},
};
use std::net::ToSocketAddrs;
use std::sync::Arc;

/// Register all routes on an app or scope
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/minecraft/servers", web::get().to(handlers::list_servers))
        .route("/server/{server}/status", web::get().to(handlers::server_status))
        .route("/server/{server}/start", web::post().to(handlers::start_server))
        .route("/server/{server}/stop", web::post().to(handlers::stop_server));
}

/// Bind the HTTP listener and serve until the server is shut down
pub async fn serve(controller: Arc<ServerController>, config: &HttpConfig) -> Result<()> {
    let addr_str = format!("{}:{}", config.address, config.port);
    let addr = addr_str
        .to_socket_addrs()
        .map_err(|e| Error::Other(format!("Failed to parse socket address: {}", e)))?
        .next()
        .ok_or_else(|| Error::Other(format!("Could not parse socket address: {}", addr_str)))?;

    tracing::info!(address = %addr_str, "Starting HTTP API with Actix Web");

    let controller = Data::new(controller);
    let server_builder = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(controller.clone())
            .configure(routes)
    });

    let workers = config.workers.unwrap_or(DEFAULT_WORKERS);
    tracing::info!(workers = workers, "Setting number of Actix Web workers");

    server_builder
        .workers(workers)
        .bind(addr)
        .map_err(|e| Error::Other(format!("Failed to bind server: {}", e)))?
        .run()
        .await
        .map_err(|e| Error::Other(format!("HTTP server error: {}", e)))?;

    tracing::info!("HTTP API shut down");
    Ok(())
}
