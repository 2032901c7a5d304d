//! Projectile observer notifications.
//!
//! Written by the runtime at the two hit hooks and the ground-stick hook. Observers (freeze,
//! lightning) react to them; the runtime never waits on them.

use bevy::prelude::*;

/// A damageable target was hit while armed.
#[derive(Message, Debug, Clone, Copy)]
pub struct ProjectileHit {
    pub projectile: Entity,
    pub owner: Option<Entity>,
    pub target: Entity,
    /// Closest point on the target to the projectile.
    pub point: Vec2,
    /// Damage the target's health actually took.
    pub damage: f32,
}

/// The projectile anchored itself to the ground.
#[derive(Message, Debug, Clone, Copy)]
pub struct ProjectileStuck {
    pub projectile: Entity,
    pub owner: Option<Entity>,
    pub point: Vec2,
    pub normal: Vec2,
}
