//! Adaptive difficulty state (persisted)

use serde::{Deserialize, Serialize};

/// Neutral value for the continuous modifiers
pub const NEUTRAL: f64 = 1.0;

/// Continuous modifiers that decay back toward neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    PaddleWidth,
    BallSpeed,
    PowerUpRate,
}

impl Modifier {
    pub const ALL: [Modifier; 3] = [
        Modifier::PaddleWidth,
        Modifier::BallSpeed,
        Modifier::PowerUpRate,
    ];

    /// Step applied per decay tick
    pub fn decay_step(&self) -> f64 {
        match self {
            Modifier::PaddleWidth | Modifier::BallSpeed => 0.05,
            Modifier::PowerUpRate => 0.03,
        }
    }

    /// Declared range the modifier may hold
    pub fn range(&self) -> (f64, f64) {
        match self {
            Modifier::PaddleWidth => (0.80, 1.30),
            Modifier::BallSpeed => (0.75, 1.20),
            Modifier::PowerUpRate => (0.85, 1.20),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::PaddleWidth => "paddle width",
            Modifier::BallSpeed => "ball speed",
            Modifier::PowerUpRate => "power-up rate",
        }
    }
}

/// Allowed brick durability offsets
pub const MIN_DURABILITY_MOD: i32 = -1;
pub const MAX_DURABILITY_MOD: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveAssists {
    pub paddle_width_mod: f64,
    pub ball_speed_mod: f64,
    pub power_up_rate_mod: f64,
    /// -1 weaker, 0 neutral, +1 harder
    pub brick_durability_mod: i32,
}

impl Default for ActiveAssists {
    fn default() -> Self {
        Self {
            paddle_width_mod: NEUTRAL,
            ball_speed_mod: NEUTRAL,
            power_up_rate_mod: NEUTRAL,
            brick_durability_mod: 0,
        }
    }
}

/// Decay deadlines in epoch-ms, 0 = inactive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecayTimers {
    pub paddle_width: u64,
    pub ball_speed: u64,
    pub power_up_rate: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveState {
    pub active_assists: ActiveAssists,
    pub decay_timers: DecayTimers,
    /// Virtual time of the last evaluation (epoch-ms)
    pub last_evaluation: u64,
}

impl AdaptiveState {
    pub fn modifier(&self, m: Modifier) -> f64 {
        match m {
            Modifier::PaddleWidth => self.active_assists.paddle_width_mod,
            Modifier::BallSpeed => self.active_assists.ball_speed_mod,
            Modifier::PowerUpRate => self.active_assists.power_up_rate_mod,
        }
    }

    pub fn modifier_mut(&mut self, m: Modifier) -> &mut f64 {
        match m {
            Modifier::PaddleWidth => &mut self.active_assists.paddle_width_mod,
            Modifier::BallSpeed => &mut self.active_assists.ball_speed_mod,
            Modifier::PowerUpRate => &mut self.active_assists.power_up_rate_mod,
        }
    }

    pub fn timer(&self, m: Modifier) -> u64 {
        match m {
            Modifier::PaddleWidth => self.decay_timers.paddle_width,
            Modifier::BallSpeed => self.decay_timers.ball_speed,
            Modifier::PowerUpRate => self.decay_timers.power_up_rate,
        }
    }

    pub fn timer_mut(&mut self, m: Modifier) -> &mut u64 {
        match m {
            Modifier::PaddleWidth => &mut self.decay_timers.paddle_width,
            Modifier::BallSpeed => &mut self.decay_timers.ball_speed,
            Modifier::PowerUpRate => &mut self.decay_timers.power_up_rate,
        }
    }

    /// Earliest armed decay deadline, if any
    pub fn next_deadline(&self) -> Option<u64> {
        Modifier::ALL
            .iter()
            .map(|&m| self.timer(m))
            .filter(|&t| t > 0)
            .min()
    }

    /// Pull every modifier back inside its declared range.
    ///
    /// Loaded saves may carry anything; the engine only ever writes in-range values.
    pub fn clamp_modifiers(&mut self) {
        for m in Modifier::ALL {
            let (lo, hi) = m.range();
            let value = self.modifier_mut(m);
            *value = if value.is_finite() {
                value.clamp(lo, hi)
            } else {
                NEUTRAL
            };
        }
        self.active_assists.brick_durability_mod = self
            .active_assists
            .brick_durability_mod
            .clamp(MIN_DURABILITY_MOD, MAX_DURABILITY_MOD);
    }

    /// True when every modifier sits at neutral
    pub fn is_neutral(&self) -> bool {
        Modifier::ALL.iter().all(|&m| self.modifier(m) == NEUTRAL)
            && self.active_assists.brick_durability_mod == 0
    }
}
