//! Level configuration types handed to the gameplay layer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_DURABILITY;

/// Brick grid, row-major. 0 = empty, 1-5 = durability.
pub type Grid = Vec<Vec<u8>>;

/// Difficulty label shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTag {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl DifficultyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTag::Easy => "easy",
            DifficultyTag::Medium => "medium",
            DifficultyTag::Hard => "hard",
        }
    }
}

/// How a brick of a given durability scores and looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickDefinition {
    pub durability: u8,
    pub points: u32,
    /// 0xRRGGBB
    pub color: u32,
}

/// Full parameter set plus brick grid for one playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    pub difficulty: DifficultyTag,
    pub ball_speed: f64,
    pub paddle_speed: f64,
    pub paddle_width: f64,
    pub power_up_drop_rate: f64,
    pub layout: Grid,
    pub brick_definitions: BTreeMap<u8, BrickDefinition>,
    /// Per-brick durability offset from the adaptive overlay (0 when not applied)
    #[serde(default)]
    pub brick_durability_mod: i32,
}

impl LevelConfig {
    pub fn rows(&self) -> usize {
        self.layout.len()
    }

    pub fn cols(&self) -> usize {
        self.layout.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Number of non-empty cells
    pub fn brick_count(&self) -> usize {
        self.layout
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell > 0)
            .count()
    }

    /// Durability a brick spawns with once the overlay is applied.
    /// Empty cells stay empty; bricks never drop below 1 or exceed the max.
    pub fn effective_durability(&self, cell: u8) -> u8 {
        if cell == 0 {
            return 0;
        }
        let adjusted = i32::from(cell) + self.brick_durability_mod;
        adjusted.clamp(1, i32::from(MAX_DURABILITY)) as u8
    }

    /// Points for destroying a brick that started at `cell` durability
    pub fn points_for(&self, cell: u8) -> u32 {
        self.brick_definitions
            .get(&cell)
            .map(|def| def.points)
            .unwrap_or(u32::from(cell) * 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LevelConfig {
        LevelConfig {
            id: 11,
            name: "Hard Level 1".to_string(),
            difficulty: DifficultyTag::Hard,
            ball_speed: 420.0,
            paddle_speed: 450.0,
            paddle_width: 78.5,
            power_up_drop_rate: 0.117,
            layout: vec![vec![0, 1, 2], vec![5, 0, 0]],
            brick_definitions: BTreeMap::new(),
            brick_durability_mod: 0,
        }
    }

    #[test]
    fn test_dimensions_and_count() {
        let config = sample();
        assert_eq!(config.rows(), 2);
        assert_eq!(config.cols(), 3);
        assert_eq!(config.brick_count(), 3);
    }

    #[test]
    fn test_effective_durability_clamps() {
        let mut config = sample();
        config.brick_durability_mod = -1;
        assert_eq!(config.effective_durability(0), 0);
        assert_eq!(config.effective_durability(1), 1);
        assert_eq!(config.effective_durability(3), 2);

        config.brick_durability_mod = 1;
        assert_eq!(config.effective_durability(5), 5);
        assert_eq!(config.effective_durability(2), 3);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("ballSpeed").is_some());
        assert!(json.get("brickDefinitions").is_some());
        assert_eq!(json["difficulty"], "hard");
    }
}
