use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::tunables::BotTunables;
use crate::plugins::actors::context::ActorCtx;
use crate::plugins::actors::fsm::Transition;

const MIN_INPUT: f32 = 0.1;
const MIN_FLIPPED_INPUT: f32 = 0.5;

/// Uniform in `[a, b]`, tolerant of a reversed or empty range.
pub(crate) fn sample_range(rng: &mut ChaCha8Rng, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON { lo } else { rng.gen_range(lo..=hi) }
}

/// Walk a random distance in a random direction, then idle.
///
/// Two watchdogs run alongside: no forward progress for `boundary_hold_seconds` means a wall
/// or rail edge (go idle early), and near-zero speed for `stuck_flip_seconds` flips direction.
/// The boundary check runs first and ends the tick when it fires.
#[derive(Debug, Clone, Default)]
pub struct BotMove {
    input: f32,
    start_x: f32,
    target_distance: f32,
    last_x: f32,
    no_progress: f32,
    stuck: f32,
}

impl BotMove {
    #[inline]
    pub fn input(&self) -> f32 {
        self.input
    }

    fn go_idle(tuning: &BotTunables, rng: &mut ChaCha8Rng) -> Transition {
        let duration = sample_range(rng, tuning.idle_seconds_min, tuning.idle_seconds_max);
        Transition::Idle { duration: Some(duration) }
    }

    pub fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        let tuning = ctx.actor.bot_tuning().cloned().unwrap_or_default();
        let sign = if ctx.rng.gen_bool(0.5) { -1.0 } else { 1.0 };

        self.input = sign * tuning.input_magnitude.abs().max(MIN_INPUT);
        self.start_x = ctx.position.x;
        self.target_distance =
            sample_range(ctx.rng, tuning.move_distance_min, tuning.move_distance_max);
        self.last_x = self.start_x;
        self.no_progress = 0.0;
        self.stuck = 0.0;

        ctx.reset_attack_trigger();
        trace!("{:?} walks {:.2} m toward {}", ctx.entity, self.target_distance, sign);
        None
    }

    pub fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        let tuning = ctx.actor.bot_tuning().cloned().unwrap_or_default();
        let x = ctx.position.x;

        if (x - self.start_x).abs() >= self.target_distance {
            return Some(Self::go_idle(&tuning, ctx.rng));
        }

        let progress = (x - self.last_x) * self.input.signum();
        if progress <= tuning.min_progress_epsilon {
            self.no_progress += ctx.dt;
            if self.no_progress >= tuning.boundary_hold_seconds {
                debug!("{:?} hit a boundary after {:.2} m", ctx.entity, (x - self.start_x).abs());
                return Some(Self::go_idle(&tuning, ctx.rng));
            }
        } else {
            self.no_progress = 0.0;
        }

        if tuning.auto_flip_on_rail_edge && self.input.abs() > 0.01 {
            if ctx.velocity.x.abs() < tuning.stuck_speed_threshold {
                self.stuck += ctx.dt;
                if self.stuck >= tuning.stuck_flip_seconds {
                    let flipped = -self.input;
                    self.input = flipped.signum() * flipped.abs().max(MIN_FLIPPED_INPUT);
                    self.stuck = 0.0;
                    self.no_progress = 0.0;
                    debug!("{:?} stuck, flipping to {}", ctx.entity, self.input);
                }
            } else {
                self.stuck = 0.0;
            }
        }

        self.last_x = x;
        None
    }

    pub fn fixed_update(&mut self, ctx: &mut ActorCtx) {
        ctx.set_input(self.input);
    }

    pub fn exit(&mut self, ctx: &mut ActorCtx) {
        ctx.set_input(0.0);
    }
}
