//! Everything a state hook may read or touch for one actor during one tick.
//!
//! Systems build an [`ActorCtx`] from the actor's components, run the state machine against it,
//! then flush the [`Outbox`] into messages. States never see the `World`, which keeps them
//! plain, testable Rust.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::components::{Actor, AnimationLatches};
use crate::plugins::animation::{Animator, names};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::mover::MoveDriver;
use crate::plugins::projectiles::components::PrototypeId;
use crate::plugins::projectiles::shooter::FireRequest;
use crate::plugins::skills::selector::SkillSelector;
use crate::plugins::skills::strategy::UseGate;

/// Side effects collected during a tick and written as messages afterwards.
#[derive(Debug, Default)]
pub struct Outbox {
    pub shots: Vec<FireRequest>,
    pub cues: Vec<Cue>,
}

/// Per-shot overrides on top of the shooter's defaults.
#[derive(Debug, Clone, Default)]
pub struct ShotSpec {
    pub prototype: Option<PrototypeId>,
    pub flight_time: Option<f32>,
    pub damage: Option<f32>,
}

pub struct ActorCtx<'a> {
    pub entity: Entity,
    pub now: f32,
    pub dt: f32,
    pub position: Vec2,
    pub velocity: &'a mut Vec2,
    pub grounded: bool,
    pub frozen: bool,
    /// Opponent position snapshot, `None` while unresolved or gone.
    pub opponent: Option<Vec2>,
    pub actor: &'a mut Actor,
    pub latches: &'a mut AnimationLatches,
    pub driver: Option<&'a mut MoveDriver>,
    pub animator: Option<&'a mut Animator>,
    pub selector: Option<&'a mut SkillSelector>,
    pub rng: &'a mut ChaCha8Rng,
    pub has_shooter: bool,
    pub out: &'a mut Outbox,
}

impl ActorCtx<'_> {
    // -------------------------------------------------------------------------
    // Stop detection / input
    // -------------------------------------------------------------------------

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.velocity.x.abs() <= self.actor.stop_threshold
    }

    #[inline]
    pub fn set_input(&mut self, x: f32) {
        if let Some(driver) = self.driver.as_deref_mut() {
            driver.set_input(x);
        }
    }

    #[inline]
    pub fn gate(&self) -> UseGate {
        UseGate {
            now: self.now,
            grounded: self.grounded,
            frozen: self.frozen,
            casting: self.actor.is_casting(),
        }
    }

    // -------------------------------------------------------------------------
    // Animation trigger hygiene
    // -------------------------------------------------------------------------

    /// Attack clip playing, or queued and about to play.
    pub fn is_in_attack(&self) -> bool {
        self.animator.as_deref().is_some_and(|a| {
            a.is_in_tag(names::ATTACK_TAG) || a.has_trigger(names::ATTACK_TRIGGER)
        })
    }

    pub fn reset_trigger(&mut self, name: &str) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.reset_trigger(name);
        }
    }

    /// Reset-then-set, so a stale trigger never doubles up.
    pub fn retrigger(&mut self, name: &str) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.reset_trigger(name);
            animator.set_trigger(name);
        }
    }

    #[inline]
    pub fn reset_attack_trigger(&mut self) {
        self.reset_trigger(names::ATTACK_TRIGGER);
    }

    #[inline]
    pub fn trigger_attack(&mut self) {
        self.retrigger(names::ATTACK_TRIGGER);
    }

    pub fn force_to_locomotion(&mut self) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.reset_trigger(names::ATTACK_TRIGGER);
            animator.crossfade(names::LOCOMOTION);
        }
    }

    #[inline]
    pub fn consume_impact(&mut self) -> bool {
        self.latches.consume_impact()
    }

    // -------------------------------------------------------------------------
    // Facing
    // -------------------------------------------------------------------------

    /// +1 facing right, -1 facing left.
    #[inline]
    pub fn facing(&self) -> f32 {
        self.driver.as_deref().map_or(1.0, MoveDriver::facing)
    }

    #[inline]
    pub fn forward_direction(&self) -> Vec2 {
        Vec2::new(self.facing(), 0.0)
    }

    pub fn face(&mut self, sign: f32) {
        if let Some(driver) = self.driver.as_deref_mut() {
            driver.force_face(sign);
        }
    }

    /// Horizontal offset to the opponent, if known.
    #[inline]
    pub fn opponent_dx(&self) -> Option<f32> {
        self.opponent.map(|o| o.x - self.position.x)
    }

    pub fn face_opponent(&mut self) {
        if let Some(dx) = self.opponent_dx() {
            self.face(dx);
        }
    }

    // -------------------------------------------------------------------------
    // Firing
    // -------------------------------------------------------------------------

    /// Point `distance` metres ahead of the actor along its facing.
    #[inline]
    pub fn forward_point(&self, distance: f32) -> Vec2 {
        self.position + self.forward_direction() * distance
    }

    pub fn fire_at(&mut self, target: Vec2, spec: ShotSpec) {
        if !self.has_shooter {
            debug!("{:?} has no shooter, shot skipped", self.entity);
            return;
        }
        self.out.shots.push(FireRequest {
            shooter: self.entity,
            target,
            prototype: spec.prototype,
            flight_time: spec.flight_time,
            damage: spec.damage,
        });
    }

    /// Returns false (and fires nothing) when the opponent is unknown.
    pub fn fire_at_opponent(&mut self, spec: ShotSpec) -> bool {
        match self.opponent {
            Some(target) => {
                self.fire_at(target, spec);
                true
            }
            None => {
                debug!("{:?} has no opponent, shot skipped", self.entity);
                false
            }
        }
    }

    #[inline]
    pub fn cue(&mut self, kind: CueKind) {
        self.out.cues.push(Cue::new(kind, self.position).from(self.entity));
    }
}
