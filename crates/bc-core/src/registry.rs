//! File-backed business code registry.
//!
//! The registry is a single JSON object mapping code → location. Every
//! `record` rereads the whole file, merges one entry and rewrites the file
//! under a mutex owned by this store.
//!
//! The mutex only serializes callers inside one process that share this
//! `RegistryStore`. Separate stores (or processes) on the same path can
//! lose each other's entries.

use crate::error::{RegistryError, Result};
use bc_common::{BusinessCode, RegistryEntry, RegistryMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a `record` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The entry was added to the file.
    Inserted,
    /// The code was already registered; the file was left untouched.
    AlreadyPresent,
}

/// Mutex-guarded registry file.
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RegistryStore {
    /// Store over `path` without touching the filesystem.
    ///
    /// Reads treat a missing file as an empty registry; the first successful
    /// `record` creates it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store over `path`, creating the parent directory and an empty file
    /// when they are missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent).map_err(|source| RegistryError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        if !store.path.exists() {
            create_file(&store.path).map_err(|source| RegistryError::CreateFile {
                path: store.path.clone(),
                source,
            })?;
        }
        // Fail at construction rather than on first record if the file is
        // not readable.
        fs::File::open(&store.path).map_err(|source| RegistryError::Read {
            path: store.path.clone(),
            source,
        })?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add `entry` unless its code is already registered.
    ///
    /// First write wins: an existing entry is never replaced, even when the
    /// new one points elsewhere.
    pub fn record(&self, entry: RegistryEntry) -> Result<RecordOutcome> {
        let _guard = self.lock();
        let mut map = self.read_map()?;
        if map.contains_key(&entry.business_code) {
            tracing::trace!(code = %entry.business_code, "business code already registered");
            return Ok(RecordOutcome::AlreadyPresent);
        }

        let code = entry.business_code.clone();
        map.insert(code.clone(), entry);
        let json = serde_json::to_vec(&map).map_err(RegistryError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(code = %code, entries = map.len(), path = %self.path.display(), "registered business code");
        Ok(RecordOutcome::Inserted)
    }

    /// Current registry contents.
    pub fn load(&self) -> Result<RegistryMap> {
        let _guard = self.lock();
        self.read_map()
    }

    /// Entry for `code`, if registered.
    pub fn lookup(&self, code: &BusinessCode) -> Result<Option<RegistryEntry>> {
        let mut map = self.load()?;
        Ok(map.remove(code))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk; a panic mid-write leaves nothing
        // in memory to repair.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_map(&self) -> Result<RegistryMap> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RegistryMap::new()),
            Err(source) => {
                return Err(RegistryError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RegistryMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o777).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn create_file(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o777)
        .open(path)
        .map(drop)
}

#[cfg(not(unix))]
fn create_file(path: &Path) -> std::io::Result<()> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map(drop)
}
