//! Player statistics and derived performance metrics
//!
//! `StatsState` is persisted. `StatsTracker` holds the ephemeral hit-interval
//! window used to derive the averaged metrics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of inter-hit deltas kept for consistency metrics
pub const HIT_WINDOW: usize = 20;
/// Samples required before a standard deviation is reported
pub const MIN_CONSISTENCY_SAMPLES: usize = 3;

/// Counters for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionStats {
    /// Active play time (ms)
    pub play_time: u64,
    pub balls_launched: u32,
    pub balls_lost: u32,
    pub bricks_broken: u32,
    pub power_ups_collected: u32,
    pub multi_ball_events: u32,
    pub laser_shots: u32,
    pub max_concurrent_balls: u32,
    pub paddle_hits: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            play_time: 0,
            balls_launched: 0,
            balls_lost: 0,
            bricks_broken: 0,
            power_ups_collected: 0,
            multi_ball_events: 0,
            laser_shots: 0,
            max_concurrent_balls: 1,
            paddle_hits: 0,
        }
    }
}

/// Metrics derived from the raw counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceStats {
    /// Paddle hits as a percentage of hits + losses
    pub precision_ratio: u32,
    /// Mean of the recent inter-hit deltas (ms)
    pub average_hit_interval: u64,
    pub paddle_move_distance: f64,
    /// Length of the last rally that ended in a loss (ms)
    pub rally_duration: u64,
    /// Time taken to clear the last level (ms)
    pub clear_speed: u64,
    /// Population std-dev of the recent inter-hit deltas (ms)
    pub hit_consistency: u64,
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self {
            precision_ratio: 100,
            average_hit_interval: 0,
            paddle_move_distance: 0.0,
            rally_duration: 0,
            clear_speed: 0,
            hit_consistency: 0,
        }
    }
}

/// Streaks and adaptive bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionStats {
    pub fail_streak: u32,
    pub success_streak: u32,
    pub adaptive_adjustments_applied: u32,
    /// Time spent with an assist active (ms)
    pub assist_time_active: u64,
    /// Time spent with a challenge active (ms)
    pub challenge_time_active: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsState {
    pub session: SessionStats,
    pub performance: PerformanceStats,
    pub progression: ProgressionStats,
}

impl StatsState {
    /// Clear per-run counters and streaks (lifetime bookkeeping survives)
    pub fn reset_run(&mut self) {
        self.session = SessionStats::default();
        self.progression.fail_streak = 0;
        self.progression.success_streak = 0;
    }

    pub fn update_precision(&mut self) {
        self.performance.precision_ratio =
            precision_ratio(self.session.paddle_hits, self.session.balls_lost);
    }
}

/// `round(100 * hits / (hits + lost))`, or 100 with no events yet
pub fn precision_ratio(paddle_hits: u32, balls_lost: u32) -> u32 {
    let total = u64::from(paddle_hits) + u64::from(balls_lost);
    if total == 0 {
        return 100;
    }
    (100.0 * f64::from(paddle_hits) / total as f64).round() as u32
}

/// Tracks inter-hit timing for the consistency metrics
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    intervals: VecDeque<u64>,
    last_hit_time: Option<u64>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ball touched the paddle at virtual time `now`
    pub fn record_paddle_hit(&mut self, stats: &mut StatsState, now: u64) {
        stats.session.paddle_hits += 1;
        self.record_hit_interval(&mut stats.performance, now);
        stats.update_precision();
    }

    pub fn record_ball_lost(&mut self, stats: &mut StatsState) {
        stats.session.balls_lost += 1;
        stats.update_precision();
    }

    /// Push the delta since the previous hit and refresh the averaged metrics
    pub fn record_hit_interval(&mut self, performance: &mut PerformanceStats, now: u64) {
        if let Some(last) = self.last_hit_time {
            self.intervals.push_back(now.saturating_sub(last));
            while self.intervals.len() > HIT_WINDOW {
                self.intervals.pop_front();
            }

            let count = self.intervals.len() as f64;
            let mean = self.intervals.iter().sum::<u64>() as f64 / count;
            performance.average_hit_interval = mean.round() as u64;

            if self.intervals.len() >= MIN_CONSISTENCY_SAMPLES {
                // Deviation is taken around the reported (rounded) mean
                let center = performance.average_hit_interval as f64;
                let variance = self
                    .intervals
                    .iter()
                    .map(|&v| (v as f64 - center).powi(2))
                    .sum::<f64>()
                    / count;
                performance.hit_consistency = variance.sqrt().round() as u64;
            }
        }
        self.last_hit_time = Some(now);
    }

    pub fn intervals(&self) -> impl Iterator<Item = &u64> {
        self.intervals.iter()
    }

    /// Forget timing history (new run)
    pub fn reset_session(&mut self) {
        self.intervals.clear();
        self.last_hit_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_default_is_100() {
        assert_eq!(precision_ratio(0, 0), 100);
        assert_eq!(StatsState::default().performance.precision_ratio, 100);
    }

    #[test]
    fn test_precision_seven_hits_three_losses() {
        let mut stats = StatsState::default();
        let mut tracker = StatsTracker::new();
        for i in 0..7 {
            tracker.record_paddle_hit(&mut stats, 1_000 * i);
        }
        for _ in 0..3 {
            tracker.record_ball_lost(&mut stats);
        }
        assert_eq!(stats.performance.precision_ratio, 70);
    }

    #[test]
    fn test_precision_rounds() {
        assert_eq!(precision_ratio(2, 1), 67);
        assert_eq!(precision_ratio(1, 2), 33);
        assert_eq!(precision_ratio(0, 4), 0);
    }

    #[test]
    fn test_first_hit_sets_no_interval() {
        let mut stats = StatsState::default();
        let mut tracker = StatsTracker::new();
        tracker.record_paddle_hit(&mut stats, 5_000);
        assert_eq!(tracker.intervals().count(), 0);
        assert_eq!(stats.performance.average_hit_interval, 0);
    }

    #[test]
    fn test_consistency_needs_three_samples() {
        let mut perf = PerformanceStats::default();
        let mut tracker = StatsTracker::new();
        tracker.record_hit_interval(&mut perf, 0);
        tracker.record_hit_interval(&mut perf, 1_000);
        tracker.record_hit_interval(&mut perf, 3_000);
        // Two samples: 1000, 2000
        assert_eq!(perf.average_hit_interval, 1_500);
        assert_eq!(perf.hit_consistency, 0);

        tracker.record_hit_interval(&mut perf, 6_000);
        // 1000, 2000, 3000 -> mean 2000, population sd ~816.5
        assert_eq!(perf.average_hit_interval, 2_000);
        assert_eq!(perf.hit_consistency, 816);
    }

    #[test]
    fn test_consistency_uses_rounded_mean() {
        let mut perf = PerformanceStats::default();
        let mut tracker = StatsTracker::new();
        for now in [0, 0, 0, 1] {
            tracker.record_hit_interval(&mut perf, now);
        }
        // Intervals 0, 0, 1: mean rounds to 0, sd around 0 is ~0.577
        assert_eq!(perf.average_hit_interval, 0);
        assert_eq!(perf.hit_consistency, 1);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut perf = PerformanceStats::default();
        let mut tracker = StatsTracker::new();
        let mut now = 0;
        tracker.record_hit_interval(&mut perf, now);
        // One slow interval, then steady 500 ms hits
        now += 10_000;
        tracker.record_hit_interval(&mut perf, now);
        for _ in 0..HIT_WINDOW {
            now += 500;
            tracker.record_hit_interval(&mut perf, now);
        }
        assert_eq!(tracker.intervals().count(), HIT_WINDOW);
        assert_eq!(perf.average_hit_interval, 500);
        assert_eq!(perf.hit_consistency, 0);
    }

    #[test]
    fn test_reset_run_keeps_lifetime_counters() {
        let mut stats = StatsState::default();
        stats.session.balls_lost = 4;
        stats.progression.fail_streak = 2;
        stats.progression.adaptive_adjustments_applied = 9;
        stats.reset_run();
        assert_eq!(stats.session, SessionStats::default());
        assert_eq!(stats.progression.fail_streak, 0);
        assert_eq!(stats.progression.adaptive_adjustments_applied, 9);
    }
}
