//! Shooter service: fixed-flight-time ballistic launch into a pooled projectile.
//!
//! Producers (idle attack loop, skill strategies) write [`FireRequest`]s and never touch the
//! pools. [`fire_projectiles`] is the single writer that acquires instances.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    Orientation, PooledProjectile, Projectile, ProjectileState, PrototypeId, active_layers,
    inactive_layers,
};
use super::pool::ProjectilePools;
use super::prototypes::{ProjectilePrototype, ProjectilePrototypes};
use crate::common::{clock, team::Team, tunables::ProjectileTunables};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::mover::MoveDriver;

pub const MIN_FLIGHT_TIME: f32 = 0.1;

/// Per-combatant firing parameters.
#[derive(Component, Debug, Clone)]
pub struct Shooter {
    pub fire_offset: Vec2,
    pub default_prototype: Option<PrototypeId>,
    pub default_flight_time: f32,
    pub default_damage: f32,
    pub lifetime: f32,
    pub stick_lifetime: f32,
    /// Non-positive keeps the prototype's gravity scale.
    pub gravity_scale_override: f32,
    pub orient: Orientation,
    pub sweep: bool,
    pub sweep_skin: f32,
    pub hit_mask: LayerMask,
}

impl Shooter {
    pub fn from_tunables(cfg: &ProjectileTunables, hit_mask: impl Into<LayerMask>) -> Self {
        Self {
            fire_offset: Vec2::from_array(cfg.fire_offset),
            default_prototype: None,
            default_flight_time: cfg.default_flight_time.max(MIN_FLIGHT_TIME),
            default_damage: cfg.default_damage.max(0.0),
            lifetime: cfg.lifetime.max(0.1),
            stick_lifetime: cfg.stick_lifetime.max(0.05),
            gravity_scale_override: cfg.gravity_scale_override,
            orient: Orientation {
                enabled: cfg.orient_to_velocity,
                min_speed: cfg.orient_min_speed.max(0.0),
                lerp_speed: cfg.orient_lerp_speed.max(0.0),
                heading_offset: cfg.heading_offset_deg.to_radians(),
            },
            sweep: cfg.segment_sweep,
            sweep_skin: cfg.sweep_skin.max(0.0),
            hit_mask: hit_mask.into(),
        }
    }

    /// Muzzle position for a shooter at `origin` facing `facing` (+1 / -1).
    #[inline]
    pub fn muzzle(&self, origin: Vec2, facing: f32) -> Vec2 {
        origin + Vec2::new(self.fire_offset.x * facing, self.fire_offset.y)
    }

    #[inline]
    pub fn gravity_scale_for(&self, proto: &ProjectilePrototype) -> f32 {
        let scale = if self.gravity_scale_override > 0.0 {
            self.gravity_scale_override
        } else {
            proto.gravity_scale
        };
        if scale <= 0.0 { 1.0 } else { scale }
    }
}

/// Intent to fire one shot. The target point is a snapshot taken by the producer.
#[derive(Message, Debug, Clone)]
pub struct FireRequest {
    pub shooter: Entity,
    pub target: Vec2,
    pub prototype: Option<PrototypeId>,
    pub flight_time: Option<f32>,
    pub damage: Option<f32>,
}

impl FireRequest {
    pub fn at(shooter: Entity, target: Vec2) -> Self {
        Self { shooter, target, prototype: None, flight_time: None, damage: None }
    }

    pub fn with_prototype(mut self, prototype: Option<PrototypeId>) -> Self {
        self.prototype = prototype;
        self
    }
}

/// Launch velocity whose unconstrained ballistic path passes through `target` after
/// `flight_time` seconds under downward gravity `g`.
#[inline]
pub fn launch_velocity(start: Vec2, target: Vec2, flight_time: f32, g: f32) -> Vec2 {
    let t = flight_time.max(MIN_FLIGHT_TIME);
    Vec2::new(
        (target.x - start.x) / t,
        (target.y - start.y + 0.5 * g * t * t) / t,
    )
}

/// Spawn one pooled, inactive instance of `proto`.
pub fn spawn_inactive(commands: &mut Commands, proto: &ProjectilePrototype) -> Entity {
    let mut ec = commands.spawn((
        Name::new(format!("Projectile({})", proto.id)),
        PooledProjectile,
        ProjectileState::Inactive,
        Projectile::inactive(proto.id.clone()),
        Sprite {
            color: proto.color,
            custom_size: Some(proto.size),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 2.0),
        Visibility::Hidden,
        RigidBody::Kinematic,
        Collider::rectangle(proto.size.x, proto.size.y),
        Sensor,
        inactive_layers(),
        LinearVelocity::ZERO,
        GravityScale(0.0),
        CollisionEventsEnabled,
        CollidingEntities::default(),
    ));
    if let Some(freeze) = &proto.freeze {
        ec.insert(freeze.clone());
    }
    if let Some(lightning) = &proto.lightning {
        ec.insert(lightning.clone());
    }
    ec.id()
}

/// Warm the default prototype pool before the first shot.
pub fn prewarm_default_pool(
    mut commands: Commands,
    prototypes: Res<ProjectilePrototypes>,
    mut pools: ResMut<ProjectilePools>,
) {
    let proto = prototypes.default_prototype();
    pools.pool_mut(&proto.id, || spawn_inactive(&mut commands, proto));
}

/// Consumer: turn fire requests into configured, flying projectiles.
pub fn fire_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<FireRequest>,
    time: Res<Time<Virtual>>,
    gravity: Res<Gravity>,
    prototypes: Res<ProjectilePrototypes>,
    mut pools: ResMut<ProjectilePools>,
    q_shooters: Query<(&Shooter, &GlobalTransform, Option<&MoveDriver>, Option<&Team>)>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&time);

    for req in requests.read() {
        let Ok((shooter, tf, driver, team)) = q_shooters.get(req.shooter) else {
            debug!("FireRequest from {:?} without a Shooter, shot skipped", req.shooter);
            continue;
        };

        let proto = prototypes.resolve(req.prototype.as_ref().or(shooter.default_prototype.as_ref()));
        let facing = driver.map_or(1.0, MoveDriver::facing);
        let start = shooter.muzzle(tf.translation().truncate(), facing);
        let gravity_scale = shooter.gravity_scale_for(proto);
        let g = gravity.0.y.abs() * gravity_scale;
        let flight_time = req.flight_time.unwrap_or(shooter.default_flight_time);
        let velocity = launch_velocity(start, req.target, flight_time, g);
        let damage = req.damage.unwrap_or(shooter.default_damage).max(0.0);
        let heading = shooter.orient.heading(velocity).unwrap_or(0.0);

        let e = pools.acquire(&proto.id, || spawn_inactive(&mut commands, proto));

        let projectile = Projectile {
            prototype: proto.id.clone(),
            armed: true,
            damage,
            owner: Some(req.shooter),
            owner_team: team.copied(),
            hit_mask: shooter.hit_mask,
            return_at: clock::Deadline::after(now, shooter.lifetime),
            stick_lifetime: shooter.stick_lifetime,
            prev_pos: start,
            sweep: shooter.sweep,
            sweep_skin: shooter.sweep_skin,
            orient: shooter.orient,
        };

        commands.entity(e).insert((
            projectile,
            ProjectileState::Flying,
            Transform::from_translation(start.extend(2.0)).with_rotation(Quat::from_rotation_z(heading)),
            Position(start),
            Rotation::radians(heading),
            Visibility::Visible,
            RigidBody::Dynamic,
            LinearVelocity(velocity),
            GravityScale(gravity_scale),
            active_layers(shooter.hit_mask),
        ));

        cues.write(Cue::new(CueKind::Launch, start).from(req.shooter));
        trace!("launched {e:?} ({}) v={velocity:?}", proto.id);
    }
}
