//! Layout strategies and playability validation

use super::config::Grid;
use super::difficulty::DifficultyParameters;
use super::rng::RandomSource;
use crate::consts::{GRID_COLS, MAX_DURABILITY};

/// Accepted fill density band for a whole layout
pub const MIN_DENSITY: f64 = 0.3;
pub const MAX_DENSITY: f64 = 0.9;
/// Bottom rows must leave room for the ball to escape
pub const BOTTOM_SAFETY_ROWS: usize = 2;
pub const MAX_BOTTOM_DENSITY: f64 = 0.5;

/// Layout strategy, chosen by `level_number % 5`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Walled sides and roof, dense upper half
    Fortress,
    /// Thresholded 2-D hash noise
    Noise,
    /// Random left half mirrored onto the right
    Symmetric,
    /// Durability and density rise layer by layer away from the paddle
    Layered,
    /// Checkerboard-weighted density with jittered durability
    Mixed,
}

impl PatternKind {
    pub fn for_level(level_number: u32) -> Self {
        match level_number % 5 {
            0 => PatternKind::Fortress,
            1 => PatternKind::Noise,
            2 => PatternKind::Symmetric,
            3 => PatternKind::Layered,
            _ => PatternKind::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Fortress => "fortress",
            PatternKind::Noise => "noise",
            PatternKind::Symmetric => "symmetric",
            PatternKind::Layered => "layered",
            PatternKind::Mixed => "mixed",
        }
    }

    /// Build a `rows x 10` grid with this strategy
    pub fn build<R: RandomSource>(&self, params: &DifficultyParameters, rng: &mut R) -> Grid {
        let rows = params.rows;
        match self {
            PatternKind::Fortress => fortress(rows, params, rng),
            PatternKind::Noise => noise(rows, params),
            PatternKind::Symmetric => symmetric(rows, params, rng),
            PatternKind::Layered => layered(rows, params, rng),
            PatternKind::Mixed => mixed(rows, params, rng),
        }
    }
}

/// Clamp a signed durability into the brick range [1, 5]
#[inline]
fn brick(durability: i32) -> u8 {
    durability.clamp(1, i32::from(MAX_DURABILITY)) as u8
}

fn fortress<R: RandomSource>(rows: usize, params: &DifficultyParameters, rng: &mut R) -> Grid {
    let avg = i32::from(params.average_durability);
    let wall = brick(avg + 1);
    let upper = brick(avg);
    let lower = brick(avg - 1);

    (0..rows)
        .map(|r| {
            (0..GRID_COLS)
                .map(|c| {
                    if c == 0 || c == GRID_COLS - 1 || r == 0 {
                        wall
                    } else if r * 2 < rows {
                        if rng.chance(0.8) { upper } else { 0 }
                    } else if rng.chance(params.brick_density) {
                        lower
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Deterministic hash noise in [0, 1)
pub fn simple_noise(x: f64, y: f64) -> f64 {
    let n = (x * 12.9898 + y * 78.233).sin() * 43758.5453123;
    n - n.floor()
}

fn noise(rows: usize, params: &DifficultyParameters) -> Grid {
    let avg = i32::from(params.average_durability);
    let threshold = 1.0 - params.brick_density;

    (0..rows)
        .map(|r| {
            (0..GRID_COLS)
                .map(|c| {
                    let n = simple_noise(r as f64 * 0.3, c as f64 * 0.3);
                    if n > threshold {
                        brick(avg + ((n - 0.5) * 3.0).floor() as i32)
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

fn symmetric<R: RandomSource>(rows: usize, params: &DifficultyParameters, rng: &mut R) -> Grid {
    let avg = i32::from(params.average_durability);
    let half = GRID_COLS / 2;

    (0..rows)
        .map(|_| {
            let mut row = vec![0u8; GRID_COLS];
            for c in 0..half {
                if rng.chance(params.brick_density) {
                    row[c] = brick(avg + rng.jitter());
                }
            }
            for c in half..GRID_COLS {
                row[c] = row[GRID_COLS - 1 - c];
            }
            row
        })
        .collect()
}

fn layered<R: RandomSource>(rows: usize, params: &DifficultyParameters, rng: &mut R) -> Grid {
    let avg = f64::from(params.average_durability);

    (0..rows)
        .map(|r| {
            // Row 0 is the top row; both durability and fill grow downward
            let depth = r as f64 / rows as f64;
            let durability = brick((avg + depth * 2.0).floor() as i32);
            let density = params.brick_density - 0.2 + depth * 0.2;
            (0..GRID_COLS)
                .map(|_| if rng.chance(density) { durability } else { 0 })
                .collect()
        })
        .collect()
}

fn mixed<R: RandomSource>(rows: usize, params: &DifficultyParameters, rng: &mut R) -> Grid {
    let avg = i32::from(params.average_durability);

    (0..rows)
        .map(|r| {
            (0..GRID_COLS)
                .map(|c| {
                    let density = if (r + c) % 2 == 0 {
                        params.brick_density
                    } else {
                        params.brick_density * 0.6
                    };
                    if rng.chance(density) {
                        brick(avg + rng.jitter())
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Bricks per row in the safe pattern (even rows, odd rows)
const SAFE_FULL_ROW: usize = 7;
const SAFE_SPARSE_ROW: usize = 3;

/// Guaranteed-playable fallback.
///
/// Even rows hold 7 bricks, odd rows 3, so every pair of adjacent rows is exactly
/// half full. The gaps rotate per row to avoid straight vertical channels.
pub fn safe_pattern(params: &DifficultyParameters) -> Grid {
    let avg = i32::from(params.average_durability);
    let strong = brick(avg);
    let weak = brick(avg - 1);

    (0..params.rows)
        .map(|r| {
            let (filled, durability) = if r % 2 == 0 {
                (SAFE_FULL_ROW, strong)
            } else {
                (SAFE_SPARSE_ROW, weak)
            };
            let offset = (r * 3) % GRID_COLS;
            (0..GRID_COLS)
                .map(|c| {
                    let slot = (c + GRID_COLS - offset) % GRID_COLS;
                    if slot < filled { durability } else { 0 }
                })
                .collect()
        })
        .collect()
}

/// Fill densities measured over a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub density: f64,
    pub bottom_density: f64,
}

impl LayoutMetrics {
    pub fn measure(grid: &Grid) -> Self {
        let bottom_start = grid.len().saturating_sub(BOTTOM_SAFETY_ROWS);
        Self {
            density: fill_ratio(grid.iter()),
            bottom_density: fill_ratio(grid[bottom_start..].iter()),
        }
    }

    pub fn is_playable(&self) -> bool {
        (MIN_DENSITY..=MAX_DENSITY).contains(&self.density)
            && self.bottom_density <= MAX_BOTTOM_DENSITY
    }
}

fn fill_ratio<'a>(rows: impl Iterator<Item = &'a Vec<u8>>) -> f64 {
    let (filled, total) = rows
        .flat_map(|row| row.iter())
        .fold((0usize, 0usize), |(filled, total), &cell| {
            (filled + usize::from(cell > 0), total + 1)
        });
    if total == 0 {
        0.0
    } else {
        filled as f64 / total as f64
    }
}

/// True if the grid meets the density band and bottom-safety rule
pub fn validate_layout(grid: &Grid) -> bool {
    LayoutMetrics::measure(grid).is_playable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::difficulty::calculate_difficulty;
    use crate::level::rng::{PcgSource, SequenceSource};

    fn dims_ok(grid: &Grid, rows: usize) -> bool {
        grid.len() == rows && grid.iter().all(|row| row.len() == GRID_COLS)
    }

    #[test]
    fn test_pattern_selection_cycles() {
        assert_eq!(PatternKind::for_level(15), PatternKind::Fortress);
        assert_eq!(PatternKind::for_level(11), PatternKind::Noise);
        assert_eq!(PatternKind::for_level(12), PatternKind::Symmetric);
        assert_eq!(PatternKind::for_level(13), PatternKind::Layered);
        assert_eq!(PatternKind::for_level(14), PatternKind::Mixed);
    }

    #[test]
    fn test_safe_pattern_always_validates() {
        for level in 11..=200 {
            let params = calculate_difficulty(level);
            let grid = safe_pattern(&params);
            assert!(dims_ok(&grid, params.rows));
            let metrics = LayoutMetrics::measure(&grid);
            assert!(metrics.is_playable(), "level {level}: {metrics:?}");
            assert_eq!(metrics.bottom_density, 0.5);
        }
    }

    #[test]
    fn test_symmetric_rows_mirror() {
        let params = calculate_difficulty(12);
        let mut rng = PcgSource::seeded(3);
        let grid = PatternKind::Symmetric.build(&params, &mut rng);
        for row in &grid {
            for c in 0..GRID_COLS {
                assert_eq!(row[c], row[GRID_COLS - 1 - c]);
            }
        }
    }

    #[test]
    fn test_fortress_walls() {
        let params = calculate_difficulty(15);
        // Never fill interior cells
        let mut rng = SequenceSource::constant(0.99);
        let grid = PatternKind::Fortress.build(&params, &mut rng);
        let wall = params.average_durability + 1;
        assert!(grid[0].iter().all(|&cell| cell == wall));
        for row in &grid {
            assert_eq!(row[0], wall);
            assert_eq!(row[GRID_COLS - 1], wall);
        }
        for row in grid.iter().skip(1) {
            assert!(row[1..GRID_COLS - 1].iter().all(|&cell| cell == 0));
        }
    }

    #[test]
    fn test_noise_is_deterministic() {
        let params = calculate_difficulty(21);
        let mut a = SequenceSource::constant(0.1);
        let mut b = PcgSource::seeded(99);
        assert_eq!(
            PatternKind::Noise.build(&params, &mut a),
            PatternKind::Noise.build(&params, &mut b)
        );
    }

    #[test]
    fn test_layered_durability_rises_with_row() {
        let params = calculate_difficulty(13);
        // Always fill so every row shows its layer durability
        let mut rng = SequenceSource::constant(0.0);
        let grid = PatternKind::Layered.build(&params, &mut rng);
        let durabilities: Vec<u8> = grid.iter().map(|row| row[0]).collect();
        assert_eq!(durabilities, vec![2, 2, 2, 2, 2, 3, 3, 3, 3]);
        assert!(durabilities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_layered_density_rises_with_row() {
        // Level 13: top row fills below 0.495, bottom row below ~0.673
        let params = calculate_difficulty(13);
        let mut rng = SequenceSource::constant(0.6);
        let grid = PatternKind::Layered.build(&params, &mut rng);
        assert!(grid[0].iter().all(|&cell| cell == 0));
        assert!(grid[grid.len() - 1].iter().all(|&cell| cell == 3));
    }

    #[test]
    fn test_durability_range() {
        for level in 11..=60 {
            let params = calculate_difficulty(level);
            let mut rng = PcgSource::seeded(u64::from(level));
            let grid = PatternKind::for_level(level).build(&params, &mut rng);
            assert!(dims_ok(&grid, params.rows));
            assert!(grid.iter().flatten().all(|&cell| cell <= MAX_DURABILITY));
        }
    }

    #[test]
    fn test_validation_rejects_extremes() {
        let empty: Grid = vec![vec![0; GRID_COLS]; 8];
        let full: Grid = vec![vec![1; GRID_COLS]; 8];
        assert!(!validate_layout(&empty));
        assert!(!validate_layout(&full));

        // Good overall density but a packed bottom
        let mut bottom_heavy: Grid = vec![vec![0; GRID_COLS]; 8];
        for row in bottom_heavy.iter_mut().skip(5) {
            row.fill(1);
        }
        let metrics = LayoutMetrics::measure(&bottom_heavy);
        assert!(metrics.density >= MIN_DENSITY);
        assert!(!metrics.is_playable());
    }
}
