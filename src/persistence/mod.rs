//! Save/load persistence with integrity verification
//!
//! Features:
//! - Versioned JSON envelope with additive migrations
//! - FNV-1a integrity checksum over the canonical payload
//! - Per-field merge against defaults (partial saves still load)
//! - Trailing-edge debounced writes on the virtual clock
//! - Degraded no-op mode when the backend is unavailable

pub mod bundle;
pub mod store;

pub use bundle::{Integrity, SaveBundle, checksum};
pub use store::{LoadReport, LoadSource, PersistenceStore};
