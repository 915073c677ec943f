//! # File-backed durable slot
//!
//! Each key lives in `<dir>/<key>.json` as an envelope carrying the payload
//! and its CRC32. Writes are atomic:
//! 1. Write to `<key>.json.tmp`
//! 2. fsync the temp file
//! 3. Rename over the final file

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{SlotError, SlotResult};
use super::{validate_key, DurableSlot};

/// On-disk wrapper around a slot payload
#[derive(Debug, Serialize, Deserialize)]
struct SlotEnvelope {
    checksum: u32,
    payload: String,
}

/// Directory of JSON slot files
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `key` has ever been written
    pub fn exists(&self, key: &str) -> bool {
        validate_key(key).is_ok() && self.path_for(key).exists()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key))
    }
}

impl DurableSlot for FileSlot {
    fn load(&self, key: &str) -> SlotResult<Option<Vec<u8>>> {
        validate_key(key)?;

        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SlotError::Io(format!("failed to read slot '{}': {}", key, e)))
            }
        };

        let envelope: SlotEnvelope = serde_json::from_str(&content)
            .map_err(|_| SlotError::Corrupted(key.to_string()))?;

        if !verify_checksum(envelope.payload.as_bytes(), envelope.checksum) {
            return Err(SlotError::Corrupted(key.to_string()));
        }

        Ok(Some(envelope.payload.into_bytes()))
    }

    fn save(&self, key: &str, payload: &[u8]) -> SlotResult<()> {
        validate_key(key)?;

        let payload = std::str::from_utf8(payload)
            .map_err(|e| SlotError::Serialization(format!("payload is not UTF-8: {}", e)))?;

        let envelope = SlotEnvelope {
            checksum: compute_checksum(payload.as_bytes()),
            payload: payload.to_string(),
        };
        let content = serde_json::to_vec(&envelope)?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| SlotError::Io(format!("failed to create slot directory: {}", e)))?;

        let temp_path = self.temp_path_for(key);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| SlotError::Io(format!("failed to create temp slot file: {}", e)))?;

        file.write_all(&content)
            .map_err(|e| SlotError::Io(format!("failed to write slot '{}': {}", key, e)))?;
        file.sync_all()
            .map_err(|e| SlotError::Io(format!("failed to fsync slot '{}': {}", key, e)))?;

        fs::rename(&temp_path, self.path_for(key))
            .map_err(|e| SlotError::Io(format!("failed to commit slot '{}': {}", key, e)))
    }

    fn remove(&self, key: &str) -> SlotResult<()> {
        validate_key(key)?;

        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlotError::Io(format!("failed to remove slot '{}': {}", key, e))),
        }
    }
}
