//! Temporary incapacitation.
//!
//! `FreezeRequest` -> [`Freeze::freeze_for`] -> (first freeze only) pin bodies and animators of
//! the actor and its descendants -> countdown -> restore -> exactly one `FreezeEnded`.
//!
//! Re-freezing while frozen extends the countdown to the later deadline and OR-combines the
//! movement lock; it never starts a second countdown.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::clock::{self, Deadline};
use crate::plugins::animation::Animator;

pub const MIN_FREEZE_SECONDS: f32 = 0.05;

#[derive(Message, Debug, Clone, Copy)]
pub struct FreezeRequest {
    pub target: Entity,
    pub seconds: f32,
    pub lock_movement: bool,
    pub stop_animation: bool,
    pub force_kinematic: bool,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct FreezeEnded {
    pub entity: Entity,
}

/// What to pin when a new countdown starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub stop_animation: bool,
    pub force_kinematic: bool,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Freeze {
    until: Deadline,
    locked: bool,
    /// Set when a countdown starts, taken by the pinning system.
    pending_pin: Option<Pin>,
    saved_bodies: Vec<(Entity, RigidBody)>,
    saved_speeds: Vec<(Entity, f32)>,
}

impl Freeze {
    /// The global frozen condition: movement tick suspended, logic tick suspended unless casting.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn remaining(&self, now: f32) -> f32 {
        self.until.remaining(now)
    }

    /// Returns true when this started a new countdown, false when it extended one.
    pub fn freeze_for(
        &mut self,
        now: f32,
        seconds: f32,
        lock_movement: bool,
        stop_animation: bool,
        force_kinematic: bool,
    ) -> bool {
        let end = now + seconds.max(MIN_FREEZE_SECONDS);
        if self.until.is_armed() {
            self.until.extend_to(end);
            self.locked |= lock_movement;
            return false;
        }
        self.until.replace(end);
        self.locked = lock_movement;
        self.pending_pin = Some(Pin { stop_animation, force_kinematic });
        true
    }

    /// Ends a due countdown. Returns true exactly once per countdown.
    fn expire(&mut self, now: f32) -> bool {
        if !self.until.is_due(now) {
            return false;
        }
        self.until.cancel();
        self.locked = false;
        self.pending_pin = None;
        true
    }
}

fn with_descendants(root: Entity, q_children: &Query<&Children>) -> Vec<Entity> {
    let mut out = vec![root];
    let mut i = 0;
    while let Some(&e) = out.get(i) {
        if let Ok(children) = q_children.get(e) {
            out.extend_from_slice(children);
        }
        i += 1;
    }
    out
}

pub fn apply_freeze_requests(
    virt: Res<Time<Virtual>>,
    mut requests: MessageReader<FreezeRequest>,
    mut q_freeze: Query<&mut Freeze>,
    mut q_bodies: Query<(&mut RigidBody, Option<&mut LinearVelocity>)>,
    mut q_animators: Query<&mut Animator>,
    q_children: Query<&Children>,
) {
    let now = clock::now(&virt);

    for req in requests.read() {
        let Ok(mut freeze) = q_freeze.get_mut(req.target) else {
            debug!("freeze target {:?} cannot be frozen", req.target);
            continue;
        };
        let started = freeze.freeze_for(
            now,
            req.seconds,
            req.lock_movement,
            req.stop_animation,
            req.force_kinematic,
        );
        if !started {
            debug!("{:?} freeze extended to {:.2}s", req.target, freeze.remaining(now));
            continue;
        }
        let Some(pin) = freeze.pending_pin.take() else {
            continue;
        };
        for entity in with_descendants(req.target, &q_children) {
            if pin.force_kinematic {
                if let Ok((mut body, vel)) = q_bodies.get_mut(entity) {
                    freeze.saved_bodies.push((entity, *body));
                    *body = RigidBody::Kinematic;
                    if let Some(mut vel) = vel {
                        vel.0 = Vec2::ZERO;
                    }
                }
            }
            if pin.stop_animation {
                if let Ok(mut animator) = q_animators.get_mut(entity) {
                    freeze.saved_speeds.push((entity, animator.speed()));
                    animator.set_speed(0.0);
                }
            }
        }
        debug!("{:?} frozen until {:.2}", req.target, now + freeze.remaining(now));
    }
}

pub fn tick_freezes(
    virt: Res<Time<Virtual>>,
    mut q_freeze: Query<(Entity, &mut Freeze)>,
    mut q_bodies: Query<&mut RigidBody>,
    mut q_animators: Query<&mut Animator>,
    mut ended: MessageWriter<FreezeEnded>,
) {
    let now = clock::now(&virt);

    for (entity, mut freeze) in &mut q_freeze {
        if !freeze.expire(now) {
            continue;
        }
        for (e, mode) in std::mem::take(&mut freeze.saved_bodies) {
            if let Ok(mut body) = q_bodies.get_mut(e) {
                *body = mode;
            }
        }
        for (e, speed) in std::mem::take(&mut freeze.saved_speeds) {
            if let Ok(mut animator) = q_animators.get_mut(e) {
                animator.set_speed(speed);
            }
        }
        debug!("{entity:?} thawed");
        ended.write(FreezeEnded { entity });
    }
}
