//! Skill casting: Begin, then the impact event (at most once), then the skill-end event.
//!
//! Only the two animation latches move the cast forward. Freezing mid-cast takes the
//! interrupted path instead: end the strategy, pay the cooldown, back to movement.

use bevy::prelude::*;

use crate::plugins::actors::context::ActorCtx;
use crate::plugins::actors::fsm::Transition;
use crate::plugins::cues::CueKind;
use crate::plugins::skills::selector::SkillCast;
use crate::plugins::skills::strategy::CastStrategy;

#[derive(Debug, Clone)]
pub struct CastingState {
    cast: SkillCast,
    preferred_facing: f32,
    impacted: bool,
    finished: bool,
}

impl From<SkillCast> for CastingState {
    fn from(cast: SkillCast) -> Self {
        Self::new(cast)
    }
}

impl CastingState {
    pub fn new(cast: SkillCast) -> Self {
        Self { cast, preferred_facing: 1.0, impacted: false, finished: false }
    }

    #[inline]
    pub fn skill_id(&self) -> &str {
        &self.cast.data.id
    }

    pub fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        let data = &self.cast.data;
        self.impacted = false;
        self.finished = false;

        ctx.actor.casting = Some(data.kind);
        ctx.latches.clear();
        ctx.reset_attack_trigger();
        ctx.retrigger(&data.animation_trigger);
        if !data.can_move_while_casting {
            ctx.set_input(0.0);
        }
        ctx.cue(CueKind::CastStart);
        debug!("{:?} casts `{}`", ctx.entity, data.id);

        self.cast.strategy.begin_cast(data, ctx);

        self.preferred_facing = ctx.opponent_dx().unwrap_or_else(|| ctx.facing());
        ctx.face(self.preferred_facing);
        None
    }

    pub fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        ctx.face(self.preferred_facing);

        if ctx.frozen {
            debug!("{:?} cast `{}` interrupted", ctx.entity, self.skill_id());
            self.finish(ctx);
            return Some(Transition::Move);
        }

        if !self.impacted && ctx.consume_impact() {
            self.impacted = true;
            self.cast.strategy.on_impact(&self.cast.data, ctx);
        }

        if ctx.latches.consume_skill_end() {
            self.finish(ctx);
            return Some(Transition::Move);
        }
        None
    }

    pub fn fixed_update(&mut self, ctx: &mut ActorCtx) {
        if !self.cast.data.can_move_while_casting {
            ctx.set_input(0.0);
        }
    }

    pub fn exit(&mut self, ctx: &mut ActorCtx) {
        if !self.finished {
            self.finish(ctx);
        }
        ctx.actor.casting = None;
        ctx.reset_trigger(&self.cast.data.animation_trigger);
    }

    /// End the strategy and pay the cooldown, once, whichever path gets here first.
    fn finish(&mut self, ctx: &mut ActorCtx) {
        if std::mem::replace(&mut self.finished, true) {
            return;
        }
        self.cast.strategy.end_cast(&self.cast.data, ctx);
        if let Some(selector) = ctx.selector.as_deref_mut() {
            selector.complete(self.cast.index, ctx.now);
        }
        ctx.actor.casting = None;
        ctx.force_to_locomotion();
    }
}
