use bevy::prelude::*;

use super::idle_attack::fire_on_impact;
use crate::common::clock::Deadline;
use crate::plugins::actors::context::ActorCtx;
use crate::plugins::actors::fsm::Transition;

const MIN_IDLE_SECONDS: f32 = 0.2;
const DEFAULT_AUTO_CAST_INTERVAL: f32 = 0.25;

/// Idle/attack for autonomous actors: gives the skill selector a throttled chance before every
/// attack cycle and walks off again after a fixed duration.
#[derive(Debug, Clone)]
pub struct BotIdleAttack {
    exit_at: f32,
    did_impact: bool,
    next_auto_cast: Deadline,
}

impl BotIdleAttack {
    pub fn new(now: f32, duration: f32) -> Self {
        Self {
            exit_at: now + duration.max(MIN_IDLE_SECONDS),
            did_impact: false,
            next_auto_cast: Deadline::NONE,
        }
    }

    #[inline]
    pub fn exit_at(&self) -> f32 {
        self.exit_at
    }

    /// Throttled auto-cast. `Some` when a skill was granted.
    fn try_auto_cast(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        if ctx.actor.is_casting() || self.next_auto_cast.remaining(ctx.now) > 0.0 {
            return None;
        }
        let gate = ctx.gate();
        let selector = ctx.selector.as_deref_mut()?;
        let cast = selector.try_use_any_usable(&gate);

        let interval = ctx
            .actor
            .bot_tuning()
            .map_or(DEFAULT_AUTO_CAST_INTERVAL, |t| t.auto_cast_interval);
        self.next_auto_cast.replace(ctx.now + interval);

        let cast = cast?;
        debug!("{:?} auto-casts `{}`", ctx.entity, cast.data.id);
        Some(Transition::Cast(cast.into()))
    }

    pub fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        self.did_impact = false;
        ctx.latches.clear();

        if let Some(cast) = self.try_auto_cast(ctx) {
            return Some(cast);
        }
        ctx.face_opponent();
        ctx.trigger_attack();
        None
    }

    pub fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        if ctx.now >= self.exit_at {
            ctx.force_to_locomotion();
            return Some(Transition::Move);
        }

        ctx.face_opponent();
        fire_on_impact(&mut self.did_impact, ctx);

        if !ctx.is_in_attack() && ctx.is_stopped() {
            if let Some(cast) = self.try_auto_cast(ctx) {
                return Some(cast);
            }
            self.did_impact = false;
            ctx.trigger_attack();
        }
        None
    }

    pub fn exit(&mut self, ctx: &mut ActorCtx) {
        ctx.force_to_locomotion();
    }
}
