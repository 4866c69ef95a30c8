//! Persisted lifecycle records.
//!
//! The controller keeps nothing about running processes in memory. What it
//! knows lives in a JSON file holding one [`ServerRecord`] per server, which
//! survives restarts of the controller itself.
//!
//! # Examples
//!
//! ```no_run
//! use server_controller::store::{RecordField, RecordStore, ServerRecord, ServerStatus};
//!
//! # async fn demo() -> server_controller::Result<()> {
//! let store = RecordStore::open("servers_info.json")?;
//! store.upsert(ServerRecord::started("paper", 4242, "playit", 4243)).await?;
//! store
//!     .update_fields(
//!         "paper",
//!         &[
//!             RecordField::Status(ServerStatus::Stopped),
//!             RecordField::MainPid(None),
//!             RecordField::ProxyPid(None),
//!         ],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
mod file;
mod record;

pub use file::RecordStore;
pub use record::{RecordField, ServerRecord, ServerStatus};
