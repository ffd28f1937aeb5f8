//! Difficulty curves for generated levels
//!
//! Every curve starts at level 11 and saturates at a cap.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_DURABILITY, MAX_GRID_ROWS, MIN_GRID_ROWS, STATIC_LEVEL_COUNT};

/// Per-level generation parameters (pure function of the level number)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyParameters {
    pub ball_speed: f64,
    pub paddle_width: f64,
    /// Target fraction of filled cells
    pub brick_density: f64,
    pub average_durability: u8,
    pub power_up_drop_rate: f64,
    pub rows: usize,
}

pub const MAX_BALL_SPEED: f64 = 800.0;
pub const MIN_PADDLE_WIDTH: f64 = 60.0;
pub const MAX_BRICK_DENSITY: f64 = 0.85;
pub const MIN_POWER_UP_DROP_RATE: f64 = 0.05;

/// Compute the difficulty curve values for `level_number`.
///
/// Levels inside the static table evaluate as the first generated tier.
pub fn calculate_difficulty(level_number: u32) -> DifficultyParameters {
    let steps = level_number.saturating_sub(STATIC_LEVEL_COUNT);
    let s = f64::from(steps);

    let durability = (2 + steps / 4).min(u32::from(MAX_DURABILITY)) as u8;
    let rows = (MIN_GRID_ROWS + (steps / 3) as usize).min(MAX_GRID_ROWS);

    DifficultyParameters {
        ball_speed: (400.0 + s * 20.0).min(MAX_BALL_SPEED),
        paddle_width: (80.0 - s * 1.5).max(MIN_PADDLE_WIDTH),
        brick_density: (0.65 + s * 0.015).min(MAX_BRICK_DENSITY),
        average_durability: durability,
        power_up_drop_rate: (0.12 - s * 0.003).max(MIN_POWER_UP_DROP_RATE),
        rows,
    }
}
