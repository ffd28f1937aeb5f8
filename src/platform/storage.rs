//! Key/value storage backends for the save bundle
//!
//! - `MemoryStorage`: in-process map (tests, headless hosts)
//! - `FileStorage`: one JSON file per key, written atomically
//!   (tmp → save, old save → backup)
//! - `LocalStorage`: browser LocalStorage (wasm32 only)

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Backend the persistence layer writes through
pub trait SaveStorage {
    /// Probe whether the backend accepts reads and writes right now
    fn is_available(&mut self) -> bool;

    /// Read the value for `key` (`None` if never written)
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`. Must not leave a partial value behind.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend with switches for simulating failures
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    unavailable: bool,
    failing_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses every operation
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Backend that probes fine but rejects writes (quota exceeded)
    pub fn with_failing_writes() -> Self {
        Self {
            failing_writes: true,
            ..Self::default()
        }
    }

    /// Seed a raw value, bypassing the write counter
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SaveStorage for MemoryStorage {
    fn is_available(&mut self) -> bool {
        !self.unavailable
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable {
            return Err(StoreError::StorageUnavailable("memory store disabled".into()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.unavailable || self.failing_writes {
            return Err(StoreError::StorageUnavailable("quota exceeded".into()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::StorageUnavailable("memory store disabled".into()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage, one `<key>.json` per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    const PROBE_FILE: &'static str = "__storage_test__";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the live save for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key))
    }

    /// Previous save, kept after each successful write
    pub fn backup_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.bak", key))
    }
}

impl SaveStorage for FileStorage {
    fn is_available(&mut self) -> bool {
        let probe = self.dir.join(Self::PROBE_FILE);
        let result = fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&probe, Self::PROBE_FILE))
            .and_then(|_| fs::remove_file(&probe));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Save directory {} unavailable: {}", self.dir.display(), e);
                false
            }
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let temp = self.temp_path_for(key);

        fs::write(&temp, value)?;
        if target.exists() {
            fs::rename(&target, self.backup_path_for(key))?;
        }
        fs::rename(&temp, &target)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        for path in [self.path_for(key), self.backup_path_for(key)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Browser LocalStorage backend
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    fn unavailable(err: wasm_bindgen::JsValue) -> StoreError {
        StoreError::StorageUnavailable(format!("{:?}", err))
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStorage for LocalStorage {
    fn is_available(&mut self) -> bool {
        const PROBE: &str = "__storage_test__";
        match Self::storage() {
            Some(storage) => {
                storage.set_item(PROBE, PROBE).is_ok() && storage.remove_item(PROBE).is_ok()
            }
            None => false,
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = Self::storage()
            .ok_or_else(|| StoreError::StorageUnavailable("no localStorage".into()))?;
        storage.get_item(key).map_err(Self::unavailable)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = Self::storage()
            .ok_or_else(|| StoreError::StorageUnavailable("no localStorage".into()))?;
        storage.set_item(key, value).map_err(Self::unavailable)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let storage = Self::storage()
            .ok_or_else(|| StoreError::StorageUnavailable("no localStorage".into()))?;
        storage.remove_item(key).map_err(Self::unavailable)
    }
}
