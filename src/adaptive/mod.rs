//! Adaptive difficulty
//!
//! A small set of bounded modifiers nudged by player performance. Each
//! continuous modifier carries a decay deadline after which it steps back to
//! neutral. `apply_to_level` overlays the modifiers onto a generated level.

pub mod engine;
pub mod state;

pub use engine::{
    Evaluation, EvaluationContext, EvaluationKind, adjustments, apply_to_level, decay, evaluate,
    is_periodic_due, track_active_time,
};
pub use state::{ActiveAssists, AdaptiveState, DecayTimers, Modifier};
