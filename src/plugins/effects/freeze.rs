//! Freeze arrow: freezes the actor it hits, raises an ice pillar where it sticks.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{clock, state::GameState};
use crate::plugins::actors::freeze::{FreezeRequest, MIN_FREEZE_SECONDS};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::projectiles::messages::{ProjectileHit, ProjectileStuck};
use crate::plugins::world::ground_layers;

const PILLAR_INITIAL_HEIGHT: f32 = 0.01;
const PILLAR_MIN_SIZE: f32 = 0.01;
const PILLAR_MIN_LIFETIME: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcePillarSpec {
    pub lifetime: f32,
    /// Final width and height in metres.
    pub scale: Vec2,
    pub rise_seconds: f32,
    pub enable_collider_after_rise: bool,
    pub align_to_normal: bool,
    /// Start this far off the surface along the normal.
    pub base_lift: f32,
    /// 0.5 for a centred pivot, 0.0 for a bottom pivot.
    pub pivot_compensation: f32,
}

impl Default for IcePillarSpec {
    fn default() -> Self {
        Self {
            lifetime: 2.5,
            scale: Vec2::new(1.0, 2.0),
            rise_seconds: 0.25,
            enable_collider_after_rise: true,
            align_to_normal: false,
            base_lift: 0.02,
            pivot_compensation: 0.5,
        }
    }
}

/// Observer component carried by freeze-arrow instances.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FreezeOnHit {
    pub seconds: f32,
    pub stop_animation: bool,
    pub force_kinematic: bool,
    pub pillar: Option<IcePillarSpec>,
}

impl Default for FreezeOnHit {
    fn default() -> Self {
        Self {
            seconds: 1.0,
            stop_animation: true,
            force_kinematic: true,
            pillar: Some(IcePillarSpec::default()),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct IcePillar {
    normal: Vec2,
    target: Vec2,
    spawned_at: f32,
    rise_seconds: f32,
    pivot_compensation: f32,
    collider_pending: bool,
    despawn_at: f32,
}

impl IcePillar {
    /// Smoothstepped rise progress in `[0, 1]`.
    pub fn progress(&self, now: f32) -> f32 {
        let t = ((now - self.spawned_at) / self.rise_seconds.max(0.01)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    #[inline]
    pub fn is_risen(&self, now: f32) -> bool {
        now - self.spawned_at >= self.rise_seconds
    }
}

pub fn freeze_on_hit(
    mut hits: MessageReader<ProjectileHit>,
    q_observer: Query<&FreezeOnHit>,
    mut requests: MessageWriter<FreezeRequest>,
    mut cues: MessageWriter<Cue>,
) {
    for hit in hits.read() {
        let Ok(effect) = q_observer.get(hit.projectile) else {
            continue;
        };
        requests.write(FreezeRequest {
            target: hit.target,
            seconds: effect.seconds.max(MIN_FREEZE_SECONDS),
            lock_movement: true,
            stop_animation: effect.stop_animation,
            force_kinematic: effect.force_kinematic,
        });
        cues.write(Cue::new(CueKind::FreezeOverlay, hit.point).from(hit.target));
    }
}

pub fn spawn_ice_pillars(
    mut commands: Commands,
    virt: Res<Time<Virtual>>,
    mut stuck: MessageReader<ProjectileStuck>,
    q_observer: Query<&FreezeOnHit>,
    mut cues: MessageWriter<Cue>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let now = clock::now(&virt);

    for ev in stuck.read() {
        let Some(spec) = q_observer.get(ev.projectile).ok().and_then(|e| e.pillar) else {
            continue;
        };
        if !seen.insert(ev.projectile) {
            continue;
        }

        let normal = ev.normal.normalize_or(Vec2::Y);
        let base = ev.point + normal * spec.base_lift;
        let target = spec.scale.max(Vec2::splat(PILLAR_MIN_SIZE));
        let rotation = if spec.align_to_normal {
            Quat::from_rotation_z(normal.to_angle() - std::f32::consts::FRAC_PI_2)
        } else {
            Quat::IDENTITY
        };

        let mut ec = commands.spawn((
            Name::new("IcePillar"),
            IcePillar {
                normal,
                target,
                spawned_at: now,
                rise_seconds: spec.rise_seconds,
                pivot_compensation: spec.pivot_compensation,
                collider_pending: spec.enable_collider_after_rise,
                despawn_at: now + spec.lifetime.max(PILLAR_MIN_LIFETIME),
            },
            Sprite {
                color: Color::srgba(0.7, 0.9, 1.0, 0.85),
                custom_size: Some(Vec2::ONE),
                ..default()
            },
            Transform {
                translation: base.extend(1.0),
                rotation,
                scale: Vec3::new(target.x, PILLAR_INITIAL_HEIGHT, 1.0),
            },
            RigidBody::Static,
            Collider::rectangle(1.0, 1.0),
            ground_layers(),
            DespawnOnExit(GameState::InGame),
        ));
        if spec.enable_collider_after_rise {
            ec.insert(ColliderDisabled);
        }
        cues.write(Cue::new(CueKind::IcePillar, base));
    }
}

pub fn grow_ice_pillars(
    mut commands: Commands,
    virt: Res<Time<Virtual>>,
    mut q: Query<(Entity, &mut IcePillar, &mut Transform)>,
) {
    let now = clock::now(&virt);

    for (e, mut pillar, mut tf) in &mut q {
        if now >= pillar.despawn_at {
            commands.entity(e).despawn();
            continue;
        }

        let height = PILLAR_INITIAL_HEIGHT
            + (pillar.target.y - PILLAR_INITIAL_HEIGHT) * pillar.progress(now);
        let grown = height - tf.scale.y;
        if grown != 0.0 {
            tf.scale = Vec3::new(pillar.target.x, height, 1.0);
            tf.translation += (pillar.normal * grown * pillar.pivot_compensation).extend(0.0);
        }

        if pillar.collider_pending && pillar.is_risen(now) {
            pillar.collider_pending = false;
            commands.entity(e).remove::<ColliderDisabled>();
        }
    }
}
