//! Movement driver: the only thing that writes horizontal velocity.
//!
//! Pipeline:
//! - Update / FixedUpdate (Act): input producers write `MoveDriver::input`
//! - FixedUpdate (Drive): accelerate `LinearVelocity.x` toward `input * max_speed`
//! - PostUpdate: mirror facing into `Transform::scale.x`
//!
//! Facing is a sign on the driver (+1 right, -1 left). It follows input while moving and can be
//! overridden immediately with [`MoveDriver::force_face`].

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{sets::TickSet, tunables::MoverTunables};
use crate::plugins::actors::freeze::Freeze;

#[derive(Component, Debug, Clone)]
pub struct MoveDriver {
    input: f32,
    facing: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
}

impl MoveDriver {
    pub fn new(cfg: &MoverTunables, facing: f32) -> Self {
        Self {
            input: 0.0,
            facing: facing_sign(facing),
            max_speed: cfg.max_speed,
            acceleration: cfg.acceleration,
            deceleration: cfg.deceleration,
        }
    }

    #[inline]
    pub fn input(&self) -> f32 {
        self.input
    }

    #[inline]
    pub fn set_input(&mut self, x: f32) {
        self.input = x.clamp(-1.0, 1.0);
    }

    #[inline]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// Overrides facing right now, without smoothing.
    #[inline]
    pub fn force_face(&mut self, sign: f32) {
        if sign != 0.0 {
            self.facing = facing_sign(sign);
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.input.abs() > 0.01
    }

    /// One step of horizontal velocity toward the input target.
    pub fn step_velocity(&mut self, vx: f32, dt: f32) -> f32 {
        let target = self.input * self.max_speed;
        let speeding_up = target.abs() > vx.abs() && (vx == 0.0 || target.signum() == vx.signum());
        let rate = if speeding_up { self.acceleration } else { self.deceleration };
        let max_delta = rate * dt;
        let next = vx + (target - vx).clamp(-max_delta, max_delta);

        if self.is_moving() {
            self.facing = facing_sign(self.input);
        }
        next
    }
}

#[inline]
fn facing_sign(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, drive_movement.in_set(TickSet::Drive))
        .add_systems(PostUpdate, sync_facing.before(TransformSystems::Propagate));
}

fn drive_movement(
    time: Res<Time>,
    mut q: Query<(&mut MoveDriver, &mut LinearVelocity, Option<&Freeze>)>,
) {
    let dt = time.delta_secs();
    for (mut driver, mut vel, freeze) in &mut q {
        if freeze.is_some_and(Freeze::is_frozen) {
            continue;
        }
        vel.x = driver.step_velocity(vel.x, dt);
    }
}

fn sync_facing(mut q: Query<(&MoveDriver, &mut Transform), Changed<MoveDriver>>) {
    for (driver, mut tf) in &mut q {
        let want = tf.scale.x.abs() * driver.facing();
        if tf.scale.x != want {
            tf.scale.x = want;
        }
    }
}
