//! The character state machine.
//!
//! Exactly one state is current. Every state implements the same four hooks (enter, logic
//! update, movement update, exit) and reports the next state as a returned [`Transition`]
//! instead of calling back into the machine. An enter hook may hand back a further transition
//! (the autonomous idle state casting straight away, for example); chains are bounded.
//!
//! ```text
//!            stopped / distance / boundary
//!  Move  ───────────────────────────────▶  Idle/Attack
//!   ▲  ◀───────────────────────────────     │
//!   │        moving / idle timeout           │ request / auto-cast
//!   │                                        ▼
//!   └──────────── skill end / frozen ──── Casting
//! ```

use bevy::prelude::*;

use super::components::Control;
use super::context::ActorCtx;
use super::states::{
    bot_idle_attack::BotIdleAttack, bot_move::BotMove, casting::CastingState,
    human_move::HumanMove, idle_attack::IdleAttack,
};

const MAX_CHAINED_TRANSITIONS: usize = 4;

#[derive(Debug)]
pub enum Transition {
    /// Into the movement state; a no-op when already moving.
    Move,
    /// A fresh movement state even if already moving.
    RestartMove,
    /// Into idle/attack. Autonomous actors leave again after `duration`.
    Idle { duration: Option<f32> },
    Cast(CastingState),
}

#[derive(Debug)]
pub enum CharacterState {
    HumanMove(HumanMove),
    BotMove(BotMove),
    IdleAttack(IdleAttack),
    BotIdleAttack(BotIdleAttack),
    Casting(CastingState),
}

impl CharacterState {
    fn build(transition: Transition, ctx: &ActorCtx) -> Self {
        let autonomous = matches!(ctx.actor.control, Control::Autonomous(_));
        match transition {
            Transition::Move | Transition::RestartMove if autonomous => Self::BotMove(BotMove::default()),
            Transition::Move | Transition::RestartMove => Self::HumanMove(HumanMove),
            Transition::Idle { duration } if autonomous => {
                Self::BotIdleAttack(BotIdleAttack::new(ctx.now, duration.unwrap_or(0.0)))
            }
            Transition::Idle { .. } => Self::IdleAttack(IdleAttack::default()),
            Transition::Cast(state) => Self::Casting(state),
        }
    }

    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self, Self::HumanMove(_) | Self::BotMove(_))
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::IdleAttack(_) | Self::BotIdleAttack(_))
    }

    #[inline]
    pub fn is_casting(&self) -> bool {
        matches!(self, Self::Casting(_))
    }

    fn enter(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        match self {
            Self::HumanMove(s) => s.enter(ctx),
            Self::BotMove(s) => s.enter(ctx),
            Self::IdleAttack(s) => s.enter(ctx),
            Self::BotIdleAttack(s) => s.enter(ctx),
            Self::Casting(s) => s.enter(ctx),
        }
    }

    fn update(&mut self, ctx: &mut ActorCtx) -> Option<Transition> {
        match self {
            Self::HumanMove(s) => s.update(ctx),
            Self::BotMove(s) => s.update(ctx),
            Self::IdleAttack(s) => s.update(ctx),
            Self::BotIdleAttack(s) => s.update(ctx),
            Self::Casting(s) => s.update(ctx),
        }
    }

    fn fixed_update(&mut self, ctx: &mut ActorCtx) {
        match self {
            Self::HumanMove(_) | Self::IdleAttack(_) | Self::BotIdleAttack(_) => {}
            Self::BotMove(s) => s.fixed_update(ctx),
            Self::Casting(s) => s.fixed_update(ctx),
        }
    }

    fn exit(&mut self, ctx: &mut ActorCtx) {
        match self {
            Self::HumanMove(_) => {}
            Self::BotMove(s) => s.exit(ctx),
            Self::IdleAttack(s) => s.exit(ctx),
            Self::BotIdleAttack(s) => s.exit(ctx),
            Self::Casting(s) => s.exit(ctx),
        }
    }
}

#[derive(Component, Debug, Default)]
pub struct StateMachine {
    current: Option<CharacterState>,
}

impl StateMachine {
    #[inline]
    pub fn current(&self) -> Option<&CharacterState> {
        self.current.as_ref()
    }

    fn is_current(&self, transition: &Transition) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        match transition {
            Transition::Move => current.is_move(),
            Transition::Idle { .. } => current.is_idle(),
            Transition::RestartMove | Transition::Cast(_) => false,
        }
    }

    /// Exit the old state, assign, enter the new one, following chained transitions.
    pub fn change_state(&mut self, transition: Transition, ctx: &mut ActorCtx) {
        let mut next = Some(transition);
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            let Some(transition) = next.take() else {
                return;
            };
            if self.is_current(&transition) {
                return;
            }
            let state = CharacterState::build(transition, ctx);
            if let Some(mut old) = self.current.take() {
                old.exit(ctx);
            }
            next = self.current.insert(state).enter(ctx);
        }
        if next.is_some() {
            warn!("{:?}: transition chain cut after {MAX_CHAINED_TRANSITIONS} hops", ctx.entity);
        }
    }

    /// Logic tick. Suspended while frozen, except that a running cast still gets to close out.
    pub fn update(&mut self, ctx: &mut ActorCtx) {
        if self.current.is_none() {
            self.change_state(Transition::Move, ctx);
        }
        if ctx.frozen && !ctx.actor.is_casting() {
            return;
        }
        if let Some(transition) = self.current.as_mut().and_then(|s| s.update(ctx)) {
            self.change_state(transition, ctx);
        }
    }

    /// Movement tick. Fully suspended while frozen.
    pub fn fixed_update(&mut self, ctx: &mut ActorCtx) {
        if ctx.frozen {
            return;
        }
        if let Some(state) = self.current.as_mut() {
            state.fixed_update(ctx);
        }
        if ctx.actor.move_lock.observe(ctx.grounded) {
            debug!("{:?}: airborne move lock released", ctx.entity);
        }
        if ctx.actor.move_lock.suppresses_input(ctx.grounded) {
            ctx.set_input(0.0);
        }
    }
}
