//! Session controller
//!
//! `GameSession` owns the whole persisted state plus the ephemeral helpers
//! (stats window, generator, save store, decay timer). The host feeds it
//! gameplay events and a regular `tick`; every call carries the virtual `now`.

use serde::{Deserialize, Serialize};

use crate::adaptive::{self, AdaptiveState, Evaluation, EvaluationContext};
use crate::error::GenerateError;
use crate::level::{LevelConfig, LevelGenerator};
use crate::persistence::{LoadReport, PersistenceStore};
use crate::platform::{SaveStorage, Scheduler, TimerId};
use crate::progress::ProgressState;
use crate::settings::SettingsState;
use crate::stats::{StatsState, StatsTracker};

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub progress: ProgressState,
    pub settings: SettingsState,
    pub stats: StatsState,
    pub adaptive: AdaptiveState,
}

/// Result of a ball leaving the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeOutcome {
    /// Other balls are still in play
    BallRemaining,
    LifeLost { lives: u32 },
    GameOver,
}

/// Power-ups as far as the session's bookkeeping is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    MultiBall,
    ExtraLife,
    /// Effect handled entirely by the host (paddle size, speed, laser...)
    Other,
}

pub struct GameSession<S: SaveStorage> {
    state: SessionState,
    generator: LevelGenerator,
    tracker: StatsTracker,
    store: PersistenceStore<S>,
    load_report: LoadReport,
    /// Wakes the session for the earliest decay deadline
    decay: Scheduler<()>,
    decay_timer: Option<TimerId>,
    /// Launch time of the current ball, `None` between rallies
    rally_start: Option<u64>,
    level_start: u64,
    last_tick: u64,
}

impl<S: SaveStorage> GameSession<S> {
    /// Load saved state from `storage` and build the controller
    pub fn boot(storage: S, seed: u64, now: u64) -> Self {
        let mut store = PersistenceStore::new(storage);
        let load_report = store.load(now);
        let mut state = load_report.state.clone();
        state.adaptive.clamp_modifiers();

        log::info!(
            "Session booted ({:?}): level {}, {} active adjustment(s)",
            load_report.source,
            state.progress.current_level,
            adaptive::adjustments(&state.adaptive).len()
        );

        let mut session = Self {
            state,
            generator: LevelGenerator::seeded(seed),
            tracker: StatsTracker::new(),
            store,
            load_report,
            decay: Scheduler::new(),
            decay_timer: None,
            rally_start: None,
            level_start: now,
            last_tick: now,
        };
        session.sync_decay_timer();
        session
    }

    /// Fresh run: score and lives reset, session counters and streaks cleared
    pub fn start_run(&mut self, now: u64) {
        self.state.progress.reset_run();
        self.state.stats.reset_run();
        self.state.stats.update_precision();
        self.tracker.reset_session();
        self.rally_start = None;
        self.level_start = now;
        self.last_tick = now;
        log::info!("Run started at level {}", self.state.progress.current_level);
    }

    /// Generated level with the current modifiers applied
    pub fn level_config(&mut self, level_number: u32) -> Result<LevelConfig, GenerateError> {
        let base = self.generator.generate(level_number)?;
        Ok(adaptive::apply_to_level(&self.state.adaptive, &base))
    }

    /// Enter `level_number` and return its adjusted config
    pub fn start_level(&mut self, level_number: u32, now: u64) -> Result<LevelConfig, GenerateError> {
        let config = self.level_config(level_number)?;
        self.state.progress.current_level = level_number;
        self.level_start = now;
        self.rally_start = None;
        Ok(config)
    }

    pub fn ball_launched(&mut self, now: u64) {
        self.state.stats.session.balls_launched += 1;
        self.rally_start = Some(now);
    }

    pub fn paddle_hit(&mut self, now: u64) {
        self.tracker.record_paddle_hit(&mut self.state.stats, now);
    }

    pub fn paddle_moved(&mut self, distance: f64) {
        if distance.is_finite() {
            self.state.stats.performance.paddle_move_distance += distance.abs();
        }
    }

    pub fn brick_broken(&mut self, points: u32) {
        self.state.stats.session.bricks_broken += 1;
        self.state.progress.add_score(points);
    }

    pub fn power_up_collected(&mut self, kind: PowerUpKind) {
        let session = &mut self.state.stats.session;
        session.power_ups_collected += 1;
        match kind {
            PowerUpKind::MultiBall => session.multi_ball_events += 1,
            PowerUpKind::ExtraLife => self.state.progress.lives += 1,
            PowerUpKind::Other => {}
        }
    }

    pub fn laser_fired(&mut self) {
        self.state.stats.session.laser_shots += 1;
    }

    /// Host reports how many balls are currently in play
    pub fn balls_in_play(&mut self, count: u32) {
        let session = &mut self.state.stats.session;
        session.max_concurrent_balls = session.max_concurrent_balls.max(count);
    }

    /// A ball fell out. A life is lost only once no ball remains.
    pub fn ball_lost(&mut self, balls_remaining: u32, now: u64) -> LifeOutcome {
        self.tracker.record_ball_lost(&mut self.state.stats);
        if balls_remaining > 0 {
            return LifeOutcome::BallRemaining;
        }

        if let Some(start) = self.rally_start.take() {
            self.state.stats.performance.rally_duration = now.saturating_sub(start);
        }
        let lives = self.state.progress.lose_life();
        let progression = &mut self.state.stats.progression;
        progression.fail_streak += 1;
        progression.success_streak = 0;

        self.evaluate(EvaluationContext::life_loss(now));

        if lives == 0 {
            let progress = &mut self.state.progress;
            progress.high_score = progress.high_score.max(progress.score);
            log::info!("Game over: score {}", progress.score);
            self.store.save(&self.state, now, true);
            LifeOutcome::GameOver
        } else {
            self.store.save(&self.state, now, false);
            LifeOutcome::LifeLost { lives }
        }
    }

    pub fn level_complete(&mut self, level_number: u32, now: u64) -> Evaluation {
        self.state.stats.performance.clear_speed = now.saturating_sub(self.level_start);
        let progression = &mut self.state.stats.progression;
        progression.success_streak += 1;
        progression.fail_streak = 0;

        let progress = &mut self.state.progress;
        progress.complete_level(level_number);
        progress.current_level = level_number + 1;
        self.rally_start = None;
        self.level_start = now;

        let evaluation = self.evaluate(EvaluationContext::level_complete(now));
        self.store.save(&self.state, now, false);
        evaluation
    }

    /// Host heartbeat.
    ///
    /// Applies due decays, runs the periodic evaluation when due and flushes
    /// the pending save. The returned evaluation carries the stagnation advisory.
    pub fn tick(&mut self, now: u64, bricks_remaining: u32) -> Evaluation {
        let elapsed = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        if self.rally_start.is_some() {
            self.state.stats.session.play_time += elapsed;
        }
        adaptive::track_active_time(&self.state.adaptive, &mut self.state.stats, elapsed);

        let mut changed = false;
        if !self.decay.drain_due(now).is_empty() {
            self.decay_timer = None;
            changed |= adaptive::decay(&mut self.state.adaptive, now);
            self.sync_decay_timer();
        }

        let mut evaluation = Evaluation::default();
        if adaptive::is_periodic_due(&self.state.adaptive, now) {
            let rally_time = self
                .rally_start
                .map_or(0, |start| now.saturating_sub(start));
            evaluation = self.evaluate(EvaluationContext::periodic(now, rally_time, bricks_remaining));
            if evaluation.needs_assistance {
                log::debug!("Rally stalled for {} ms with {} bricks left", rally_time, bricks_remaining);
            }
        }
        evaluation.changed |= changed;

        if evaluation.changed {
            self.store.save(&self.state, now, false);
        }
        self.store.tick(&self.state, now);
        evaluation
    }

    /// Mutate settings and schedule a save
    pub fn update_settings(&mut self, now: u64, update: impl FnOnce(&mut SettingsState)) {
        update(&mut self.state.settings);
        self.store.save(&self.state, now, false);
    }

    /// Write everything now (page hide, quit)
    pub fn shutdown(&mut self, now: u64) {
        self.store.save(&self.state, now, true);
    }

    /// Labels for the active difficulty adjustments
    pub fn adjustments(&self) -> Vec<String> {
        adaptive::adjustments(&self.state.adaptive)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tracker(&self) -> &StatsTracker {
        &self.tracker
    }

    /// Diagnostics from the boot-time load
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    fn evaluate(&mut self, context: EvaluationContext) -> Evaluation {
        let evaluation = adaptive::evaluate(&mut self.state.adaptive, &mut self.state.stats, &context);
        if evaluation.changed {
            self.sync_decay_timer();
        }
        evaluation
    }

    /// Re-arm the wakeup for the earliest decay deadline.
    ///
    /// Decay fires strictly after a deadline, hence the +1.
    fn sync_decay_timer(&mut self) {
        if let Some(id) = self.decay_timer.take() {
            self.decay.cancel(id);
        }
        if let Some(deadline) = self.state.adaptive.next_deadline() {
            self.decay_timer = Some(self.decay.schedule(deadline + 1, ()));
        }
    }
}
