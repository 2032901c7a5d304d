use crate::plugins::actors::context::{ActorCtx, ShotSpec};
use crate::plugins::actors::fsm::Transition;

/// Stand, face the opponent, shoot on every attack impact. Leaves as soon as the actor moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAttack {
    did_impact: bool,
}

impl IdleAttack {
    pub fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        self.did_impact = false;
        ctx.latches.clear();
        ctx.face_opponent();
        ctx.trigger_attack();
        None
    }

    pub fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        if !ctx.is_stopped() {
            ctx.force_to_locomotion();
            return Some(Transition::Move);
        }

        ctx.face_opponent();
        fire_on_impact(&mut self.did_impact, ctx);

        if !ctx.is_in_attack() && ctx.is_stopped() {
            self.did_impact = false;
            ctx.trigger_attack();
        }
        None
    }

    pub fn exit(&mut self, ctx: &mut ActorCtx) {
        ctx.force_to_locomotion();
    }
}

/// One shot per attack cycle, however many impacts arrive.
pub(super) fn fire_on_impact(did_impact: &mut bool, ctx: &mut ActorCtx) {
    if !*did_impact && ctx.consume_impact() {
        *did_impact = true;
        ctx.fire_at_opponent(ShotSpec::default());
    }
}
