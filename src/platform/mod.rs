//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time: virtual-time scheduler driven by the host tick
//! - Storage: LocalStorage on web, files or memory on native

pub mod storage;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{FileStorage, MemoryStorage, SaveStorage};
pub use time::{Scheduler, TimerId};

/// Route `log` output to the browser console
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::Level) {
    if console_log::init_with_level(level).is_err() {
        log::warn!("Logger already initialized");
    }
}
