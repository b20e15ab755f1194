use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::backend::interface::Result;
use crate::backend::MemoryStore;

/// Values are kept readable on disk when they are UTF-8 and fall back to a
/// byte array otherwise.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Text(String),
    Bytes(Vec<u8>)
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        match std::str::from_utf8(value) {
            Ok(text) => StoredValue::Text(text.to_owned()),
            Err(_) => StoredValue::Bytes(value.to_vec())
        }
    }
}

impl From<StoredValue> for Vec<u8> {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Text(text) => text.into_bytes(),
            StoredValue::Bytes(bytes) => bytes
        }
    }
}

/// World state persisted as a single JSON document mapping keys to values.
pub struct JsonStore {
    path: PathBuf
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the world state. A missing file is an empty world state.
    pub fn read(&self) -> Result<MemoryStore> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("no state file at {}, starting empty", self.path.display());
                return Ok(MemoryStore::new());
            },
            Err(err) => return Err(err.into())
        };

        let entries: BTreeMap<String, StoredValue> = serde_json::from_str(&content)?;
        debug!("loaded {} keys from {}", entries.len(), self.path.display());
        Ok(entries.into_iter().map(|(key, value)| (key, Vec::<u8>::from(value))).collect())
    }

    /// Replaces the file contents with `state`. The document is written to a
    /// sibling file first and renamed over the old one.
    pub fn save(&self, state: &MemoryStore) -> Result<()> {
        let entries: BTreeMap<&str, StoredValue> = state.entries()
            .map(|(key, value)| (key, StoredValue::from(value)))
            .collect();
        let serialised = serde_json::to_string_pretty(&entries)?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serialised)?;
        fs::rename(&staging, &self.path)?;
        debug!("saved {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}
