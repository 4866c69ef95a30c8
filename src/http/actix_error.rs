//! Actix Web error adapters for controller errors.
//!
//! Maps each [`Error`] onto a status code and a JSON body whose `kind` lets
//! clients tell "not authorized", "not found" and "operational failure" apart
//! without parsing the message.

use crate::error::{AuthError, Error};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

impl Error {
    /// Short machine-readable class of this error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Auth(AuthError::ServerMismatch { .. }) => "forbidden",
            Error::Auth(_) => "unauthorized",
            Error::ServerNotFound(_) => "not_found",
            _ => "failure",
        }
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code)
            .content_type("application/json")
            .json(json!({
                "error": self.to_string(),
                "kind": self.kind(),
                "code": status_code.as_u16()
            }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Auth(AuthError::ServerMismatch { .. }) => StatusCode::FORBIDDEN,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::ServerNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
