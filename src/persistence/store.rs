//! Debounced save store over a `SaveStorage` backend

use crate::consts::{SAVE_DEBOUNCE_MS, SAVE_VERSION, STORAGE_KEY};
use crate::platform::{SaveStorage, Scheduler, TimerId};
use crate::session::SessionState;

use super::bundle::{self, Integrity, SaveBundle};

/// Where the loaded state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A stored bundle was parsed (possibly migrated or repaired)
    Stored,
    /// Nothing stored yet
    Empty,
    /// Backend unavailable; store is now a no-op
    Unavailable,
    /// Stored bundle was not parseable JSON
    Malformed,
}

/// Outcome of `PersistenceStore::load`
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub state: SessionState,
    /// Timestamp of the stored bundle, or the load time for fresh defaults
    pub timestamp: u64,
    pub source: LoadSource,
    pub integrity: Integrity,
    /// Source schema version when a migration ran
    pub migrated_from: Option<u32>,
}

impl LoadReport {
    fn fresh(source: LoadSource, now: u64) -> Self {
        Self {
            state: SessionState::default(),
            timestamp: now,
            source,
            integrity: Integrity::Missing,
            migrated_from: None,
        }
    }

    pub fn checksum_mismatch(&self) -> bool {
        matches!(self.integrity, Integrity::Mismatch { .. })
    }

    /// Nothing usable was stored, so the state is all defaults
    pub fn used_defaults(&self) -> bool {
        self.source != LoadSource::Stored
    }

    /// Saves are disabled for this session
    pub fn is_degraded(&self) -> bool {
        self.source == LoadSource::Unavailable
    }
}

/// Persistence store
///
/// Non-immediate saves are debounced on virtual time: each call restarts a
/// `SAVE_DEBOUNCE_MS` window and the state passed to `tick` when the window
/// closes is what gets written. Failed writes are logged and dropped.
#[derive(Debug)]
pub struct PersistenceStore<S: SaveStorage> {
    storage: S,
    key: String,
    /// Version written on save; never below the loaded one
    version: u32,
    degraded: bool,
    flushes: Scheduler<()>,
    pending: Option<TimerId>,
}

impl<S: SaveStorage> PersistenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            version: SAVE_VERSION,
            degraded: false,
            flushes: Scheduler::new(),
            pending: None,
        }
    }

    /// Load, verify, migrate and merge the stored bundle.
    ///
    /// Never fails: every problem degrades to defaults with a diagnostic.
    pub fn load(&mut self, now: u64) -> LoadReport {
        if !self.storage.is_available() {
            self.degraded = true;
            log::info!("Save storage unavailable, progress will not persist");
            return LoadReport::fresh(LoadSource::Unavailable, now);
        }
        self.degraded = false;

        let text = match self.storage.read(&self.key) {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                log::info!("No save data found, starting fresh");
                return LoadReport::fresh(LoadSource::Empty, now);
            }
            Err(e) => {
                self.degraded = true;
                log::warn!("Failed to read save data: {}", e);
                return LoadReport::fresh(LoadSource::Unavailable, now);
            }
        };

        let decoded = match bundle::decode(&text) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::error!("Discarding save data: {}", e);
                return LoadReport::fresh(LoadSource::Malformed, now);
            }
        };

        match &decoded.integrity {
            Integrity::Verified => {}
            Integrity::Missing => log::warn!("Save data has no checksum"),
            Integrity::Mismatch { stored, computed } => log::warn!(
                "Save checksum mismatch (stored {}, computed {}), loading anyway",
                stored,
                computed
            ),
        }

        let from = bundle::source_version(&decoded.fields);
        let (fields, migrated_from) = if from < SAVE_VERSION {
            log::info!("Migrating save data v{} -> v{}", from, SAVE_VERSION);
            (bundle::migrate(decoded.fields, from), Some(from))
        } else {
            if from > SAVE_VERSION {
                log::warn!("Save data v{} is newer than v{}", from, SAVE_VERSION);
            }
            (decoded.fields, None)
        };
        self.version = from.max(SAVE_VERSION);

        let timestamp = fields
            .get("timestamp")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(now);
        let mut state = bundle::merge_with_defaults(&fields);
        state.adaptive.clamp_modifiers();

        log::debug!(
            "Loaded save: level {}, high score {}",
            state.progress.current_level,
            state.progress.high_score
        );

        LoadReport {
            state,
            timestamp,
            source: LoadSource::Stored,
            integrity: decoded.integrity,
            migrated_from,
        }
    }

    /// Request a save. Immediate saves write now and cancel any pending one.
    pub fn save(&mut self, state: &SessionState, now: u64, immediate: bool) {
        if self.degraded {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.flushes.cancel(id);
        }
        if immediate {
            self.flush(state, now);
        } else {
            self.pending = Some(self.flushes.schedule(now + SAVE_DEBOUNCE_MS, ()));
        }
    }

    /// Write the pending save if its window has closed. Returns true on a write.
    pub fn tick(&mut self, state: &SessionState, now: u64) -> bool {
        if self.flushes.drain_due(now).is_empty() {
            return false;
        }
        self.pending = None;
        self.flush(state, now)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Due time of the pending save
    pub fn next_flush(&mut self) -> Option<u64> {
        self.flushes.next_due()
    }

    /// Delete the stored bundle and drop any pending write
    pub fn clear(&mut self) {
        if let Some(id) = self.pending.take() {
            self.flushes.cancel(id);
        }
        if self.degraded {
            return;
        }
        match self.storage.remove(&self.key) {
            Ok(()) => log::info!("Save data cleared"),
            Err(e) => log::error!("Failed to clear save data: {}", e),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn flush(&mut self, state: &SessionState, now: u64) -> bool {
        let mut bundle = SaveBundle::new(state.clone(), now);
        bundle.version = self.version;

        let encoded = match bundle.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("Failed to encode save data: {}", e);
                return false;
            }
        };

        match self.storage.write(&self.key, &encoded) {
            Ok(()) => {
                log::debug!("Saved progress ({} bytes)", encoded.len());
                true
            }
            Err(e) => {
                log::error!("Failed to save progress: {}", e);
                false
            }
        }
    }
}
