//! Brick Balance - gameplay balancing and persistence core for a brick-breaker
//!
//! Core modules:
//! - `level`: Procedural level generation for the endless hard mode (level 11+)
//! - `adaptive`: Adaptive difficulty (bounded modifiers with timed decay)
//! - `stats`: Derived performance metrics (precision, hit consistency)
//! - `persistence`: Save/load with versioning, migration and integrity checks
//! - `platform`: Storage backends and the virtual-time scheduler
//! - `session`: Top-level controller owning all session state
//!
//! Rendering, input, physics and audio live in the host. They feed events in and
//! read `LevelConfig`s out; nothing here touches a wall clock or a global.

pub mod adaptive;
pub mod error;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod session;
pub mod settings;
pub mod stats;

pub use adaptive::{AdaptiveState, Evaluation, EvaluationContext, EvaluationKind};
pub use error::{GenerateError, StoreError};
pub use level::{DifficultyParameters, LevelConfig, LevelGenerator, PatternKind};
pub use persistence::{LoadReport, LoadSource, PersistenceStore, SaveBundle};
pub use session::{GameSession, LifeOutcome, SessionState};
pub use settings::SettingsState;

/// Game configuration constants
pub mod consts {
    /// Levels 1..=10 come from the static table, everything above is generated
    pub const STATIC_LEVEL_COUNT: u32 = 10;

    /// Generated grid dimensions
    pub const GRID_COLS: usize = 10;
    pub const MIN_GRID_ROWS: usize = 8;
    pub const MAX_GRID_ROWS: usize = 12;

    /// Brick durability range (0 = empty cell)
    pub const MAX_DURABILITY: u8 = 5;

    /// Paddle speed for every generated level (pixels/s)
    pub const GENERATED_PADDLE_SPEED: f64 = 450.0;

    /// Lives at the start of a run
    pub const STARTING_LIVES: u32 = 3;

    /// Persisted schema version
    pub const SAVE_VERSION: u32 = 2;
    /// Storage key for the save bundle
    pub const STORAGE_KEY: &str = "breakout.save.v2";
    /// Trailing-edge debounce for non-immediate saves (ms)
    pub const SAVE_DEBOUNCE_MS: u64 = 400;

    /// Minimum virtual time between periodic adaptive evaluations (ms)
    pub const PERIODIC_EVALUATION_MS: u64 = 5_000;
}
