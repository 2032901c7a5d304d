//! In-flight behaviour: swept ground check, ground stick, reorientation, expiry.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState, inactive_layers, stick_pose};
use super::messages::ProjectileStuck;
use crate::common::{clock, layers::Layer};
use crate::plugins::cues::{Cue, CueKind};

/// Everything a ground stick writes, bundled so the sweep and the discrete path share it.
pub(crate) struct StickSite {
    pub point: Vec2,
    pub normal: Vec2,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn stick_to_ground(
    e: Entity,
    site: StickSite,
    now: f32,
    projectile: &mut Projectile,
    state: &mut ProjectileState,
    tf: &mut Transform,
    pos: &mut Position,
    vel: &mut LinearVelocity,
    body: &mut RigidBody,
    layers: &mut CollisionLayers,
    stuck: &mut MessageWriter<ProjectileStuck>,
    cues: &mut MessageWriter<Cue>,
) {
    let (at, angle) = stick_pose(site.point, site.normal, projectile.orient.heading_offset);
    tf.translation = at.extend(tf.translation.z);
    tf.rotation = Quat::from_rotation_z(angle);
    pos.0 = at;
    vel.0 = Vec2::ZERO;
    *body = RigidBody::Kinematic;
    *layers = inactive_layers();

    projectile.stick(now);
    projectile.prev_pos = at;
    *state = ProjectileState::Stuck;

    stuck.write(ProjectileStuck {
        projectile: e,
        owner: projectile.owner,
        point: site.point,
        normal: site.normal,
    });
    cues.write(Cue::new(CueKind::GroundStick, site.point));
}

/// Segment cast from last tick's position to this one. A ground hit wins over any discrete
/// collision reported for the same tick.
#[allow(clippy::type_complexity)]
pub fn sweep_ground(
    spatial: SpatialQuery,
    time: Res<Time<Virtual>>,
    mut q: Query<
        (
            Entity,
            &mut Projectile,
            &mut ProjectileState,
            &mut Transform,
            &mut Position,
            &mut LinearVelocity,
            &mut RigidBody,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
    mut stuck: MessageWriter<ProjectileStuck>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&time);
    let filter = SpatialQueryFilter::from_mask(Layer::Ground);

    for (e, mut projectile, mut state, mut tf, mut pos, mut vel, mut body, mut layers) in &mut q {
        if *state != ProjectileState::Flying {
            continue;
        }
        let current = pos.0;
        let segment = current - projectile.prev_pos;
        let distance = segment.length();

        if projectile.sweep && distance > 0.0 {
            let origin = projectile.prev_pos;
            if let Ok(dir) = Dir2::new(segment) {
                let reach = distance + projectile.sweep_skin;
                if let Some(hit) = spatial.cast_ray(origin, dir, reach, true, &filter) {
                    let site = StickSite {
                        point: origin + *dir * hit.distance,
                        normal: hit.normal,
                    };
                    stick_to_ground(
                        e,
                        site,
                        now,
                        &mut projectile,
                        &mut state,
                        &mut tf,
                        &mut pos,
                        &mut vel,
                        &mut body,
                        &mut layers,
                        &mut stuck,
                        &mut cues,
                    );
                    continue;
                }
            }
        }
        projectile.prev_pos = current;
    }
}

/// Turn armed, unstuck projectiles toward their velocity.
pub fn orient_to_velocity(
    time: Res<Time>,
    mut q: Query<(&Projectile, &ProjectileState, &LinearVelocity, &mut Transform), With<PooledProjectile>>,
) {
    let dt = time.delta_secs();
    for (projectile, state, vel, mut tf) in &mut q {
        if *state != ProjectileState::Flying || !projectile.armed {
            continue;
        }
        let Some(heading) = projectile.orient.heading(vel.0) else {
            continue;
        };
        let target = Quat::from_rotation_z(heading);
        let lerp = projectile.orient.lerp_speed;
        tf.rotation = if lerp > 0.0 {
            tf.rotation.slerp(target, (lerp * dt).min(1.0))
        } else {
            target
        };
    }
}

/// Flight and stick deadlines both end in a return.
pub fn expire_projectiles(
    time: Res<Time<Virtual>>,
    mut q: Query<(&mut Projectile, &mut ProjectileState), With<PooledProjectile>>,
) {
    let now = clock::now(&time);
    for (mut projectile, mut state) in &mut q {
        if !matches!(*state, ProjectileState::Flying | ProjectileState::Stuck) {
            continue;
        }
        if projectile.return_at.is_due(now) {
            projectile.disarm();
            *state = ProjectileState::PendingReturn;
        }
    }
}
