//! Projectile instance data.

use avian2d::prelude::*;
use bevy::prelude::*;
use serde::Deserialize;

use crate::common::{clock::Deadline, layers::Layer, team::Team};

/// Which prototype (and therefore which pool) an instance belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PrototypeId(pub String);

impl PrototypeId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct PooledProjectile;

/// Lifecycle of a pooled instance.
///
/// ```text
/// Inactive --configure--> Flying --ground--> Stuck --deadline--> PendingReturn
///                           |  \--hit----------------------------^      |
///                           \----deadline------------------------^      |
/// Inactive <-----------------------------commit-------------------------/
/// ```
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Flying,
    Stuck,
    PendingReturn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub enabled: bool,
    pub min_speed: f32,
    pub lerp_speed: f32,
    pub heading_offset: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self { enabled: true, min_speed: 0.05, lerp_speed: 12.0, heading_offset: 0.0 }
    }
}

impl Orientation {
    /// Heading for `velocity`, or `None` below the minimum speed.
    #[inline]
    pub fn heading(&self, velocity: Vec2) -> Option<f32> {
        if !self.enabled || velocity.length_squared() < self.min_speed * self.min_speed {
            return None;
        }
        Some(velocity.y.atan2(velocity.x) + self.heading_offset)
    }
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub prototype: PrototypeId,
    pub armed: bool,
    pub damage: f32,
    pub owner: Option<Entity>,
    pub owner_team: Option<Team>,
    pub hit_mask: LayerMask,
    pub return_at: Deadline,
    pub stick_lifetime: f32,
    pub prev_pos: Vec2,
    pub sweep: bool,
    pub sweep_skin: f32,
    pub orient: Orientation,
}

impl Projectile {
    pub const STICK_INSET: f32 = 0.01;

    pub fn inactive(prototype: PrototypeId) -> Self {
        Self {
            prototype,
            armed: false,
            damage: 0.0,
            owner: None,
            owner_team: None,
            hit_mask: LayerMask::NONE,
            return_at: Deadline::NONE,
            stick_lifetime: 1.0,
            prev_pos: Vec2::ZERO,
            sweep: true,
            sweep_skin: 0.02,
            orient: Orientation::default(),
        }
    }

    /// A shot never damages the entity that fired it, nor anyone on its team.
    #[inline]
    pub fn excludes(&self, root: Entity, team: Option<Team>) -> bool {
        self.owner == Some(root) || (team.is_some() && team == self.owner_team)
    }

    /// Clears the armed flag and every pending deadline.
    #[inline]
    pub fn disarm(&mut self) {
        self.armed = false;
        self.return_at.cancel();
    }

    /// Ground-anchor at `now`: disarmed, flight deadline replaced by the stick lifetime.
    pub fn stick(&mut self, now: f32) {
        self.armed = false;
        self.return_at.replace(now + self.stick_lifetime);
    }
}

/// Where and how a stuck projectile rests against a surface.
pub fn stick_pose(point: Vec2, normal: Vec2, heading_offset: f32) -> (Vec2, f32) {
    let n = normal.normalize_or(Vec2::Y);
    let pos = point - n * Projectile::STICK_INSET;
    let angle = (-n.y).atan2(-n.x) + heading_offset;
    (pos, angle)
}

#[inline]
pub fn active_layers(hit_mask: LayerMask) -> CollisionLayers {
    CollisionLayers::new(Layer::Projectile, hit_mask | LayerMask::from(Layer::Ground))
}

/// "Disabled" without structural changes: empty filters means we collide with nothing.
#[inline]
pub fn inactive_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Projectile, LayerMask::NONE)
}
