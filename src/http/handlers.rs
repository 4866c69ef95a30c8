//! HTTP request handlers.
//!
//! - `GET /minecraft/servers` lists configured servers
//! - `GET /server/{name}/status` reports the last known status, no key needed
//! - `POST /server/{name}/start` and `POST /server/{name}/stop` require the
//!   `api-key` header
//!
//! Unknown servers on status and stop answer `{}` rather than an error.

use crate::ServerController;
use crate::error::{AuthError, Result};

use actix_web::{
    HttpRequest, HttpResponse,
    web::{Data, Path},
};
use serde_json::json;
use std::sync::Arc;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "api-key";

fn credential(req: &HttpRequest) -> Result<&str> {
    let value = req
        .headers()
        .get(API_KEY_HEADER)
        .ok_or(AuthError::MissingCredential)?;

    // A header that isn't valid text can't match any configured key
    Ok(value.to_str().map_err(|_| AuthError::UnknownCredential)?)
}

/// List configured servers
pub async fn list_servers(controller: Data<Arc<ServerController>>) -> HttpResponse {
    HttpResponse::Ok().json(controller.list_servers())
}

/// Last known status of a server
pub async fn server_status(
    controller: Data<Arc<ServerController>>,
    server: Path<String>,
) -> Result<HttpResponse> {
    tracing::debug!(server = %server, "Status requested");

    let response = match controller.status(&server).await? {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::Ok().json(json!({})),
    };
    Ok(response)
}

/// Start a server's process pair
pub async fn start_server(
    controller: Data<Arc<ServerController>>,
    server: Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let key = credential(&req)?;
    let record = controller.start(&server, key).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Stop a server's process pair
pub async fn stop_server(
    controller: Data<Arc<ServerController>>,
    server: Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let key = credential(&req)?;

    let response = match controller.stop(&server, key).await? {
        Some(result) => HttpResponse::Ok().json(result),
        None => HttpResponse::Ok().json(json!({})),
    };
    Ok(response)
}
