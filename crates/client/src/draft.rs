//! Locally stored HPI drafts.
//!
//! Drafts live in a small key/value storage under [`DRAFT_KEY`], mirroring how a page
//! keeps form state in browser local storage. Two backends are provided: in-memory and a
//! directory with one JSON file per key.

use crate::error::{StorageError, StorageResult};
use api_shared::HpiReq;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DRAFT_KEY: &str = "hpiAssistantDraft";

/// String key/value storage.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage backed by `<dir>/<key>.json` files.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// A saved draft and when it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDraft {
    pub saved_at: DateTime<Utc>,
    pub fields: HpiReq,
}

/// HPI draft persistence on top of a [`LocalStorage`].
#[derive(Clone, Debug)]
pub struct DraftStore<S> {
    storage: S,
}

impl<S: LocalStorage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The saved draft, if any. An unreadable or corrupt entry is logged and ignored.
    pub fn load(&self) -> Option<StoredDraft> {
        let raw = match self.storage.get_item(DRAFT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("could not read HPI draft: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!("discarding unreadable HPI draft: {}", e);
                None
            }
        }
    }

    pub fn save(&mut self, fields: &HpiReq) -> StorageResult<()> {
        let draft = StoredDraft {
            saved_at: Utc::now(),
            fields: fields.clone(),
        };
        let raw = serde_json::to_string(&draft)?;
        self.storage.set_item(DRAFT_KEY, &raw)
    }

    pub fn clear(&mut self) -> StorageResult<()> {
        self.storage.remove_item(DRAFT_KEY)
    }
}
