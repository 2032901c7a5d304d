//! Return commit: recycle projectiles back into their prototype pool.
//!
//! This system is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive projectiles must be:
//! - hidden
//! - velocity = 0, kinematic, no gravity
//! - collide with nothing (filters empty)
//! - disarmed, with no pending deadline
//!
//! Centralizing these writes here prevents inconsistencies.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState, inactive_layers};
use super::pool::ProjectilePools;

#[allow(clippy::type_complexity)]
pub fn return_to_pool_commit(
    mut pools: ResMut<ProjectilePools>,
    mut q: Query<
        (
            Entity,
            &mut Projectile,
            &mut ProjectileState,
            &mut Visibility,
            &mut LinearVelocity,
            &mut RigidBody,
            &mut GravityScale,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
) {
    for (e, mut projectile, mut state, mut vis, mut vel, mut body, mut gravity, mut layers) in &mut q {
        if *state != ProjectileState::PendingReturn {
            continue;
        }

        *state = ProjectileState::Inactive;
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *body = RigidBody::Kinematic;
        gravity.0 = 0.0;
        *layers = inactive_layers();
        projectile.disarm();
        projectile.owner = None;
        projectile.owner_team = None;

        pools.release(&projectile.prototype, e);
    }
}
