//! Adaptive difficulty evaluation
//!
//! Every evaluation decays expired modifiers first, then applies the rule for
//! the triggering event. A single call can therefore clear a timer and re-arm
//! it straight away.

use super::state::{AdaptiveState, MAX_DURABILITY_MOD, MIN_DURABILITY_MOD, Modifier, NEUTRAL};
use crate::consts::PERIODIC_EVALUATION_MS;
use crate::level::LevelConfig;
use crate::stats::StatsState;

/// Assist lifetime before decay starts (ms)
pub const ASSIST_DURATION_MS: u64 = 120_000;
/// Challenge lifetime before decay starts (ms)
pub const CHALLENGE_DURATION_MS: u64 = 90_000;
/// Interval between decay steps once a timer has expired (ms)
pub const DECAY_INTERVAL_MS: u64 = 45_000;
/// Distance from neutral at which a decaying modifier snaps back
pub const SNAP_TOLERANCE: f64 = 0.02;
/// Distance from neutral below which a modifier is not reported
pub const LABEL_EPSILON: f64 = 0.01;

/// Consecutive lives lost / levels cleared before the engine steps in
pub const STREAK_THRESHOLD: u32 = 3;
pub const LOW_PRECISION: u32 = 60;
pub const HIGH_PRECISION: u32 = 90;
/// Rally length that counts as stagnation (ms)
pub const STAGNATION_RALLY_MS: u64 = 10_000;

/// Absolute bounds applied to level parameters after modifiers
pub const BALL_SPEED_BOUNDS: (f64, f64) = (120.0, 800.0);
pub const PADDLE_WIDTH_BOUNDS: (f64, f64) = (60.0, 150.0);
pub const POWER_UP_RATE_BOUNDS: (f64, f64) = (0.05, 0.30);

/// What triggered an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationKind {
    /// Player lost their last ball
    LifeLoss,
    /// Player cleared a level
    LevelComplete,
    /// Host heartbeat while a level is running
    Periodic {
        /// Time since the current ball was launched (ms)
        rally_time: u64,
        bricks_remaining: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    pub kind: EvaluationKind,
    /// Virtual time (epoch-ms)
    pub now: u64,
}

impl EvaluationContext {
    pub fn life_loss(now: u64) -> Self {
        Self {
            kind: EvaluationKind::LifeLoss,
            now,
        }
    }

    pub fn level_complete(now: u64) -> Self {
        Self {
            kind: EvaluationKind::LevelComplete,
            now,
        }
    }

    pub fn periodic(now: u64, rally_time: u64, bricks_remaining: u32) -> Self {
        Self {
            kind: EvaluationKind::Periodic {
                rally_time,
                bricks_remaining,
            },
            now,
        }
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Advisory only: the rally has stalled and the host may intervene
    pub needs_assistance: bool,
    /// A modifier or decay timer changed (worth persisting)
    pub changed: bool,
}

/// Run decay, then the rule for `context.kind`
pub fn evaluate(
    adaptive: &mut AdaptiveState,
    stats: &mut StatsState,
    context: &EvaluationContext,
) -> Evaluation {
    let before_assists = adaptive.active_assists.clone();
    let before_timers = adaptive.decay_timers.clone();
    let now = context.now;

    decay(adaptive, now);

    let mut needs_assistance = false;
    match context.kind {
        EvaluationKind::LifeLoss => apply_fail_assist(adaptive, stats, now),
        EvaluationKind::LevelComplete => {
            apply_success_challenge(adaptive, stats, now);
            apply_precision(adaptive, stats.performance.precision_ratio, now);
        }
        EvaluationKind::Periodic {
            rally_time,
            bricks_remaining,
        } => needs_assistance = is_stagnant(rally_time, bricks_remaining),
    }

    adaptive.last_evaluation = now;

    Evaluation {
        needs_assistance,
        changed: before_assists != adaptive.active_assists
            || before_timers != adaptive.decay_timers,
    }
}

/// True once enough virtual time has passed for a periodic evaluation
pub fn is_periodic_due(adaptive: &AdaptiveState, now: u64) -> bool {
    now.saturating_sub(adaptive.last_evaluation) >= PERIODIC_EVALUATION_MS
}

/// Step every expired modifier one notch toward neutral.
///
/// Returns true if any modifier moved.
pub fn decay(adaptive: &mut AdaptiveState, now: u64) -> bool {
    let mut moved = false;
    for m in Modifier::ALL {
        let deadline = adaptive.timer(m);
        if deadline == 0 || now <= deadline {
            continue;
        }

        let value = adaptive.modifier(m);
        let stepped = if value > NEUTRAL {
            value - m.decay_step()
        } else {
            value + m.decay_step()
        };

        if (value - NEUTRAL).abs() < SNAP_TOLERANCE || (stepped - NEUTRAL).abs() < SNAP_TOLERANCE {
            *adaptive.modifier_mut(m) = NEUTRAL;
            *adaptive.timer_mut(m) = 0;
            log::info!("Adaptive: {} normalized", m.as_str());
        } else {
            *adaptive.modifier_mut(m) = stepped;
            *adaptive.timer_mut(m) = now + DECAY_INTERVAL_MS;
            log::debug!("Adaptive: {} decayed to {:.2}", m.as_str(), stepped);
        }
        moved = true;
    }
    moved
}

/// Set a continuous modifier and re-arm its timer
fn arm(adaptive: &mut AdaptiveState, m: Modifier, value: f64, deadline: u64, reason: &str) {
    *adaptive.modifier_mut(m) = value;
    *adaptive.timer_mut(m) = deadline;
    log::info!("Adaptive: {} set to {:.2} ({})", m.as_str(), value, reason);
}

fn set_durability(adaptive: &mut AdaptiveState, value: i32, reason: &str) {
    adaptive.active_assists.brick_durability_mod = value;
    log::info!("Adaptive: brick durability {:+} ({})", value, reason);
}

fn apply_fail_assist(adaptive: &mut AdaptiveState, stats: &mut StatsState, now: u64) {
    if stats.progression.fail_streak < STREAK_THRESHOLD {
        return;
    }
    let deadline = now + ASSIST_DURATION_MS;
    let applied = &mut stats.progression.adaptive_adjustments_applied;

    if adaptive.active_assists.paddle_width_mod < 1.25 {
        arm(adaptive, Modifier::PaddleWidth, 1.20, deadline, "assist");
        *applied += 1;
    }
    if adaptive.active_assists.ball_speed_mod > 0.80 {
        arm(adaptive, Modifier::BallSpeed, 0.85, deadline, "assist");
        *applied += 1;
    }
    if adaptive.active_assists.power_up_rate_mod < 1.15 {
        arm(adaptive, Modifier::PowerUpRate, 1.12, deadline, "assist");
        *applied += 1;
    }
    if adaptive.active_assists.brick_durability_mod > MIN_DURABILITY_MOD {
        set_durability(adaptive, MIN_DURABILITY_MOD, "assist");
    }
}

fn apply_success_challenge(adaptive: &mut AdaptiveState, stats: &mut StatsState, now: u64) {
    if stats.progression.success_streak < STREAK_THRESHOLD {
        return;
    }
    let deadline = now + CHALLENGE_DURATION_MS;
    let applied = &mut stats.progression.adaptive_adjustments_applied;

    if adaptive.active_assists.ball_speed_mod < 1.10 {
        arm(adaptive, Modifier::BallSpeed, 1.10, deadline, "challenge");
        *applied += 1;
    }
    if adaptive.active_assists.paddle_width_mod > 0.88 {
        arm(adaptive, Modifier::PaddleWidth, 0.88, deadline, "challenge");
        *applied += 1;
    }
    if adaptive.active_assists.brick_durability_mod < MAX_DURABILITY_MOD {
        set_durability(adaptive, MAX_DURABILITY_MOD, "challenge");
    }
    if adaptive.active_assists.power_up_rate_mod > 0.92 {
        arm(adaptive, Modifier::PowerUpRate, 0.94, deadline, "challenge");
        *applied += 1;
    }
}

fn apply_precision(adaptive: &mut AdaptiveState, precision_ratio: u32, now: u64) {
    if precision_ratio < LOW_PRECISION {
        if adaptive.active_assists.paddle_width_mod < 1.08 {
            arm(
                adaptive,
                Modifier::PaddleWidth,
                1.08,
                now + CHALLENGE_DURATION_MS,
                "low precision",
            );
        }
        if adaptive.active_assists.brick_durability_mod > MIN_DURABILITY_MOD {
            set_durability(adaptive, MIN_DURABILITY_MOD, "low precision");
        }
    } else if precision_ratio > HIGH_PRECISION
        && adaptive.active_assists.brick_durability_mod < MAX_DURABILITY_MOD
    {
        set_durability(adaptive, MAX_DURABILITY_MOD, "high precision");
    }
}

/// Rally has run long with bricks still standing
pub fn is_stagnant(rally_time: u64, bricks_remaining: u32) -> bool {
    rally_time > STAGNATION_RALLY_MS && bricks_remaining > 0
}

/// Overlay the current modifiers onto a level (pure)
pub fn apply_to_level(adaptive: &AdaptiveState, config: &LevelConfig) -> LevelConfig {
    let assists = &adaptive.active_assists;
    let clamp = |value: f64, (lo, hi): (f64, f64)| value.clamp(lo, hi);

    LevelConfig {
        ball_speed: clamp(config.ball_speed * assists.ball_speed_mod, BALL_SPEED_BOUNDS),
        paddle_width: clamp(config.paddle_width * assists.paddle_width_mod, PADDLE_WIDTH_BOUNDS),
        power_up_drop_rate: clamp(
            config.power_up_drop_rate * assists.power_up_rate_mod,
            POWER_UP_RATE_BOUNDS,
        ),
        brick_durability_mod: assists.brick_durability_mod,
        ..config.clone()
    }
}

/// Human-readable labels for every non-neutral modifier
pub fn adjustments(adaptive: &AdaptiveState) -> Vec<String> {
    let assists = &adaptive.active_assists;
    let mut active = Vec::new();

    let mut label = |value: f64, above: &str, below: &str| {
        if (value - NEUTRAL).abs() > LABEL_EPSILON {
            let text = if value > NEUTRAL { above } else { below };
            active.push(text.to_string());
        }
    };
    label(assists.paddle_width_mod, "Wider Paddle", "Narrower Paddle");
    label(assists.ball_speed_mod, "Faster Ball", "Slower Ball");
    label(assists.power_up_rate_mod, "More Power-ups", "Fewer Power-ups");

    if assists.brick_durability_mod > 0 {
        active.push("Harder Bricks".to_string());
    } else if assists.brick_durability_mod < 0 {
        active.push("Weaker Bricks".to_string());
    }
    active
}

/// Credit `elapsed` ms to the assist/challenge time counters
pub fn track_active_time(adaptive: &AdaptiveState, stats: &mut StatsState, elapsed: u64) {
    let assists = &adaptive.active_assists;
    let assisting = assists.paddle_width_mod > NEUTRAL
        || assists.ball_speed_mod < NEUTRAL
        || assists.power_up_rate_mod > NEUTRAL
        || assists.brick_durability_mod < 0;
    let challenging = assists.paddle_width_mod < NEUTRAL
        || assists.ball_speed_mod > NEUTRAL
        || assists.power_up_rate_mod < NEUTRAL
        || assists.brick_durability_mod > 0;

    if assisting {
        stats.progression.assist_time_active += elapsed;
    }
    if challenging {
        stats.progression.challenge_time_active += elapsed;
    }
}
