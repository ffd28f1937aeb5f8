//! Level generator for the endless hard mode

use std::collections::BTreeMap;

use super::config::{BrickDefinition, DifficultyTag, Grid, LevelConfig};
use super::difficulty::{DifficultyParameters, calculate_difficulty};
use super::patterns::{LayoutMetrics, PatternKind, safe_pattern};
use super::rng::{PcgSource, RandomSource};
use crate::consts::{GENERATED_PADDLE_SPEED, MAX_DURABILITY, STATIC_LEVEL_COUNT};
use crate::error::GenerateError;

/// Brick colors by durability tier (0xRRGGBB)
pub const BRICK_PALETTE: [u32; 9] = [
    0xFF6B6B, // red
    0xF9A826, // orange
    0xF7DC6F, // yellow
    0x52C41A, // green
    0x4ECDC4, // cyan
    0x3498DB, // blue
    0x9B59B6, // purple
    0xE91E63, // pink
    0x795548, // brown
];

/// Points awarded per durability point
pub const POINTS_PER_DURABILITY: u32 = 20;

/// Produces `LevelConfig`s for levels past the static table
#[derive(Debug, Clone)]
pub struct LevelGenerator<R = PcgSource> {
    rng: R,
}

impl LevelGenerator<PcgSource> {
    /// Generator backed by a seeded PCG stream
    pub fn seeded(seed: u64) -> Self {
        Self::new(PcgSource::seeded(seed))
    }
}

impl<R: RandomSource> LevelGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate the full configuration for `level_number` (must be > 10)
    pub fn generate(&mut self, level_number: u32) -> Result<LevelConfig, GenerateError> {
        if level_number <= STATIC_LEVEL_COUNT {
            return Err(GenerateError::InvalidLevelNumber(level_number));
        }

        let difficulty = calculate_difficulty(level_number);
        let layout = self.generate_layout(level_number, &difficulty);

        log::info!(
            "Level {} ({}): {} rows, ball {:.0}, paddle {:.1}",
            level_number,
            PatternKind::for_level(level_number).as_str(),
            layout.len(),
            difficulty.ball_speed,
            difficulty.paddle_width
        );

        Ok(LevelConfig {
            id: level_number,
            name: format!("Hard Level {}", level_number - STATIC_LEVEL_COUNT),
            difficulty: DifficultyTag::Hard,
            ball_speed: difficulty.ball_speed,
            paddle_speed: GENERATED_PADDLE_SPEED,
            paddle_width: difficulty.paddle_width,
            power_up_drop_rate: difficulty.power_up_drop_rate,
            layout,
            brick_definitions: create_brick_definitions(&difficulty),
            brick_durability_mod: 0,
        })
    }

    /// Build and validate the brick grid, falling back to the safe pattern
    pub fn generate_layout(&mut self, level_number: u32, difficulty: &DifficultyParameters) -> Grid {
        let kind = PatternKind::for_level(level_number);
        let grid = kind.build(difficulty, &mut self.rng);

        let metrics = LayoutMetrics::measure(&grid);
        if metrics.is_playable() {
            return grid;
        }

        log::debug!(
            "Level {} {} layout rejected (density {:.2}, bottom {:.2}), using safe pattern",
            level_number,
            kind.as_str(),
            metrics.density,
            metrics.bottom_density
        );
        safe_pattern(difficulty)
    }
}

/// Brick tiers 1..=min(5, avg + 2), colored from the palette
pub fn create_brick_definitions(difficulty: &DifficultyParameters) -> BTreeMap<u8, BrickDefinition> {
    let max_durability = (difficulty.average_durability + 2).min(MAX_DURABILITY);

    (1..=max_durability)
        .map(|durability| {
            let color_index = usize::from(durability - 1) % BRICK_PALETTE.len();
            let definition = BrickDefinition {
                durability,
                points: u32::from(durability) * POINTS_PER_DURABILITY,
                color: BRICK_PALETTE[color_index],
            };
            (durability, definition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GRID_COLS;
    use crate::level::patterns::{MAX_BOTTOM_DENSITY, MAX_DENSITY, MIN_DENSITY};
    use crate::level::rng::SequenceSource;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_static_levels() {
        let mut generator = LevelGenerator::seeded(1);
        assert_eq!(
            generator.generate(10),
            Err(GenerateError::InvalidLevelNumber(10))
        );
        assert_eq!(
            generator.generate(0),
            Err(GenerateError::InvalidLevelNumber(0))
        );
        assert!(generator.generate(11).is_ok());
    }

    #[test]
    fn test_level_metadata() {
        let mut generator = LevelGenerator::seeded(5);
        let config = generator.generate(23).unwrap();
        assert_eq!(config.id, 23);
        assert_eq!(config.name, "Hard Level 13");
        assert_eq!(config.difficulty, DifficultyTag::Hard);
        assert_eq!(config.paddle_speed, 450.0);
        assert_eq!(config.brick_durability_mod, 0);
    }

    #[test]
    fn test_brick_definitions() {
        let defs = create_brick_definitions(&calculate_difficulty(11));
        // avg 2 -> tiers 1..=4
        assert_eq!(defs.len(), 4);
        assert_eq!(defs[&1].points, 20);
        assert_eq!(defs[&4].points, 80);
        assert_eq!(defs[&1].color, 0xFF6B6B);
        assert_eq!(defs[&4].color, 0x52C41A);

        let capped = create_brick_definitions(&calculate_difficulty(40));
        assert_eq!(capped.len(), 5);
        assert_eq!(capped[&5].points, 100);
    }

    #[test]
    fn test_every_grid_cell_has_definition() {
        let mut generator = LevelGenerator::seeded(77);
        for level in 11..=80 {
            let config = generator.generate(level).unwrap();
            for &cell in config.layout.iter().flatten() {
                assert!(cell == 0 || config.brick_definitions.contains_key(&cell));
            }
        }
    }

    #[test]
    fn test_same_seed_same_levels() {
        let mut a = LevelGenerator::seeded(2024);
        let mut b = LevelGenerator::seeded(2024);
        for level in 11..40 {
            assert_eq!(a.generate(level).unwrap(), b.generate(level).unwrap());
        }
    }

    #[test]
    fn test_failing_layout_falls_back_to_safe_pattern() {
        // Every random check passes -> fortress fills completely and is rejected
        let mut generator = LevelGenerator::new(SequenceSource::constant(0.0));
        let difficulty = calculate_difficulty(15);
        let grid = generator.generate_layout(15, &difficulty);
        assert_eq!(grid, safe_pattern(&difficulty));
    }

    #[test]
    fn test_passing_layout_is_kept() {
        // Fill, skip, fill... -> symmetric rows of 6 and 4 bricks, half full overall
        let sequence = vec![0.0, 0.5, 0.99];
        let mut generator = LevelGenerator::new(SequenceSource::new(sequence.clone()));
        let difficulty = calculate_difficulty(12);
        let grid = generator.generate_layout(12, &difficulty);

        let expected = PatternKind::Symmetric.build(&difficulty, &mut SequenceSource::new(sequence));
        assert_eq!(grid, expected);
        assert_ne!(grid, safe_pattern(&difficulty));
        assert_eq!(LayoutMetrics::measure(&grid).density, 0.5);
    }

    proptest! {
        #[test]
        fn prop_generated_layouts_are_playable(level in 11u32..=200, seed in any::<u64>()) {
            let mut generator = LevelGenerator::seeded(seed);
            let config = generator.generate(level).unwrap();
            let expected_rows = calculate_difficulty(level).rows;

            prop_assert_eq!(config.layout.len(), expected_rows);
            prop_assert!(config.layout.iter().all(|row| row.len() == GRID_COLS));

            let metrics = LayoutMetrics::measure(&config.layout);
            prop_assert!(metrics.density >= MIN_DENSITY && metrics.density <= MAX_DENSITY);
            prop_assert!(metrics.bottom_density <= MAX_BOTTOM_DENSITY);
        }
    }
}
