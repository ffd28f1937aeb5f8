//! Player progress (persisted)

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    pub current_level: u32,
    pub high_score: u64,
    /// Highest level the player may start from
    pub unlocked_level: u32,
    pub levels_completed: u32,
    pub score: u64,
    pub lives: u32,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current_level: 1,
            high_score: 0,
            unlocked_level: 1,
            levels_completed: 0,
            score: 0,
            lives: STARTING_LIVES,
        }
    }
}

impl ProgressState {
    /// Reset score and lives for a fresh run
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += u64::from(points);
    }

    /// Remove a life, returning how many remain
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Record a cleared level: bump counters, high score and unlocks
    pub fn complete_level(&mut self, level: u32) {
        self.levels_completed += 1;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        if level >= self.unlocked_level {
            self.unlocked_level = level + 1;
        }
    }
}
