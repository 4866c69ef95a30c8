//! Results returned by controller operations.
//!
//! These serialize to the JSON bodies the HTTP routes answer with.

use crate::store::ServerStatus;
use serde::{Deserialize, Serialize};

/// Answer to a status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Last known state
    pub status: ServerStatus,
}

/// Answer to a stop request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopResult {
    /// State the server was in before the stop
    pub status: ServerStatus,
    /// Server that was stopped
    pub server: String,
}
