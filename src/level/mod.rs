//! Procedural level generation
//!
//! Levels beyond the static table are built from per-level difficulty curves and
//! one of five layout strategies. Every accepted layout is validated for
//! playability; a deterministic safe pattern replaces anything that fails.
//!
//! Randomness comes only from the injected `RandomSource`, so a seeded source
//! reproduces the same levels.

pub mod config;
pub mod difficulty;
pub mod generator;
pub mod patterns;
pub mod rng;

pub use config::{BrickDefinition, DifficultyTag, Grid, LevelConfig};
pub use difficulty::{DifficultyParameters, calculate_difficulty};
pub use generator::{LevelGenerator, create_brick_definitions};
pub use patterns::{LayoutMetrics, PatternKind, safe_pattern, validate_layout};
pub use rng::{PcgSource, RandomSource, SequenceSource};
