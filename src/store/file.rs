use crate::error::{Error, Result};
use crate::store::record::{RecordField, ServerRecord};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// File-backed collection of [`ServerRecord`]s.
///
/// The whole collection is loaded and rewritten on every mutation. Writers
/// are serialized through a single lock and each rewrite goes to a temp file
/// that is renamed over the target, so readers never observe a partial
/// write and can skip the lock.
pub struct RecordStore {
    /// Location of the JSON records file
    path: PathBuf,
    /// Single-writer lock over the read-modify-write cycle
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Open the store at `path`, checking that any existing file parses.
    ///
    /// A missing file is treated as an empty collection.
    ///
    /// # Errors
    ///
    /// * [`Error::StoreCorrupt`] if the file exists but cannot be parsed,
    ///   including when it is empty
    /// * [`Error::StoreUnavailable`] if the file cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = match std::fs::read_to_string(&path) {
            Ok(content) => parse_records(&path, &content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };

        tracing::info!(path = %path.display(), num_records = records.len(), "Opened record store");

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record, in stored order
    pub async fn read_all(&self) -> Result<Vec<ServerRecord>> {
        load(&self.path).await
    }

    /// Find the record for `server`
    pub async fn find(&self, server: &str) -> Result<Option<ServerRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.server == server))
    }

    /// Insert `record`, or replace the existing record for the same server in place
    pub async fn upsert(&self, record: ServerRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = load(&self.path).await?;
        match records.iter_mut().find(|r| r.server == record.server) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }

        persist(&self.path, &records).await
    }

    /// Set one field of the record for `server`.
    ///
    /// Returns `false` and leaves the store untouched when no such record exists.
    pub async fn update_field(&self, server: &str, field: RecordField) -> Result<bool> {
        self.update_fields(server, &[field]).await
    }

    /// Set several fields of the record for `server` in one write
    pub async fn update_fields(&self, server: &str, fields: &[RecordField]) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut records = load(&self.path).await?;
        let Some(record) = records.iter_mut().find(|r| r.server == server) else {
            tracing::debug!(server = %server, "No record to update");
            return Ok(false);
        };

        for field in fields {
            record.apply(field);
        }

        persist(&self.path, &records).await?;
        Ok(true)
    }
}

async fn load(path: &Path) -> Result<Vec<ServerRecord>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_records(path, &content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(unavailable(path, e)),
    }
}

fn parse_records(path: &Path, content: &str) -> Result<Vec<ServerRecord>> {
    // Writes always leave at least `[]`, so an empty file means lost data
    if content.trim().is_empty() {
        return Err(Error::StoreCorrupt(format!("{}: file is empty", path.display())));
    }

    serde_json::from_str(content)
        .map_err(|e| Error::StoreCorrupt(format!("{}: {}", path.display(), e)))
}

async fn persist(path: &Path, records: &[ServerRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(records)
        .map_err(|e| Error::Other(format!("Failed to serialize records: {}", e)))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| unavailable(path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());
    let temp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    if let Err(e) = write_synced(&temp_path, content.as_bytes()).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(unavailable(&temp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(unavailable(path, e));
    }

    tracing::trace!(path = %path.display(), num_records = records.len(), "Persisted records");
    Ok(())
}

/// Write `content` and flush it to disk, so a rename never exposes an empty file
async fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

fn unavailable(path: &Path, e: io::Error) -> Error {
    Error::StoreUnavailable(format!("{}: {}", path.display(), e))
}
