//! File system backend.
//!
//! Layout: `{root}/{group}/{sha256(key)}.json`. Each file holds the original
//! key, the expiry as unix milliseconds and the serialized value. Writes go
//! through a temp file in the group directory and are renamed into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{CacheBackend, CleanMode};
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    key: String,
    expires_at_ms: i64,
    value: String,
}

impl FileEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Entries stored as JSON files, one directory per group.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates the backend, making sure `root` exists.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn group_dir(&self, group: &str) -> PathBuf {
        self.root.join(group)
    }

    fn entry_path(&self, group: &str, key: &str) -> PathBuf {
        let name = hex::encode(Sha256::digest(key.as_bytes()));
        self.group_dir(group).join(format!("{name}.json"))
    }

    /// Removes a group directory, returning how many live entries it held.
    fn remove_group(&self, dir: &Path) -> Result<u64> {
        let now = Utc::now().timestamp_millis();
        let mut live = 0u64;

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && read_entry(&path)?.is_some_and(|e| !e.is_expired(now))
            {
                live += 1;
            }
        }

        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(live),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(live),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_entry(path: &Path) -> Result<Option<FileEntry>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&raw) {
        Ok(entry) => Ok(Some(entry)),
        Err(e) => {
            warn!(cache.file = %path.display(), error = %e, "Discarding corrupt cache file");
            let _ = fs::remove_file(path);
            Ok(None)
        }
    }
}

impl CacheBackend for FileBackend {
    fn get(&self, group: &str, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(group, key);
        let Some(entry) = read_entry(&path)? else {
            return Ok(None);
        };

        if entry.key != key {
            // digest collision; never serve another key's value
            return Ok(None);
        }
        if entry.is_expired(Utc::now().timestamp_millis()) {
            let _ = fs::remove_file(&path);
            debug!(cache.group = %group, cache.key = %key, "Expired cache file removed");
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn store(&self, group: &str, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let dir = self.group_dir(group);
        fs::create_dir_all(&dir)?;

        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = FileEntry {
            key: key.to_string(),
            expires_at_ms: Utc::now().timestamp_millis().saturating_add(ttl_ms),
            value: value.to_string(),
        };

        // Unique temp file per writer; the rename replaces the entry atomically
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string(&entry)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.entry_path(group, key)).map_err(|e| e.error)?;

        Ok(())
    }

    fn remove(&self, group: &str, key: &str) -> Result<bool> {
        let path = self.entry_path(group, key);
        let live = read_entry(&path)?
            .is_some_and(|e| e.key == key && !e.is_expired(Utc::now().timestamp_millis()));

        match fs::remove_file(&path) {
            Ok(()) => Ok(live),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn clean(&self, scope: &str, mode: CleanMode) -> Result<u64> {
        match mode {
            CleanMode::Group => self.remove_group(&self.group_dir(scope)),
            CleanMode::Prefix => {
                let mut removed = 0u64;
                for entry in fs::read_dir(&self.root)? {
                    let entry = entry?;
                    if !entry.file_type()?.is_dir() {
                        continue;
                    }
                    let name = entry.file_name();
                    if mode.matches(scope, &name.to_string_lossy()) {
                        removed += self.remove_group(&entry.path())?;
                    }
                }
                Ok(removed)
            }
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
