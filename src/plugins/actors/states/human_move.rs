use crate::plugins::actors::context::ActorCtx;
use crate::plugins::actors::fsm::Transition;

/// Input-driven movement. The movement driver writes velocity; this state only watches for
/// the actor coming to rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanMove;

impl HumanMove {
    pub fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        ctx.reset_attack_trigger();
        None
    }

    pub fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        ctx.is_stopped().then_some(Transition::Idle { duration: None })
    }
}
