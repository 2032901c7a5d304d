//! Lightning arrow: a short sequence of area strikes where the arrow lands.
//!
//! ```text
//! ProjectileHit / ProjectileStuck ─► LightningSequence (anchor, next_at)
//!                                        │ every `interval`
//!                                        v
//!                                   LightningStrike (radius, lifetime) ─► DamageSink
//! ```
//!
//! The sequence is its own entity, so it survives the arrow going back to its pool.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{clock, layers::Layer, state::GameState, team::Team};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::health::{DamageSink, Health};
use crate::plugins::projectiles::messages::{ProjectileHit, ProjectileStuck};

/// Strikes fired in one tick at most; a long hitch drops the rest to the next tick.
const MAX_STRIKES_PER_TICK: u32 = 4;
const MIN_INTERVAL: f32 = 0.01;

/// Observer component carried by lightning-arrow instances.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct LightningOnHit {
    pub strike_count: u32,
    pub interval: f32,
    pub damage: f32,
    pub radius: f32,
    pub strike_lifetime: f32,
    pub spawn_offset: Vec2,
    /// How far below a body hit the ground is searched for.
    pub ground_probe: f32,
}

impl Default for LightningOnHit {
    fn default() -> Self {
        Self {
            strike_count: 2,
            interval: 1.0,
            damage: 50.0,
            radius: 1.0,
            strike_lifetime: 0.5,
            spawn_offset: Vec2::new(0.0, 0.02),
            ground_probe: 5.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct LightningSequence {
    pub anchor: Vec2,
    pub spec: LightningOnHit,
    pub fired: u32,
    pub next_at: f32,
    pub owner: Option<Entity>,
    pub hit_mask: LayerMask,
}

/// Set on sequences started by a body hit; cleared once the anchor is dropped to the ground.
#[derive(Component, Debug, Clone, Copy)]
pub struct SnapToGround {
    pub depth: f32,
}

#[derive(Component, Debug, Clone)]
pub struct LightningStrike {
    pub damage: f32,
    pub radius: f32,
    pub hit_mask: LayerMask,
    pub owner: Option<Entity>,
    pub despawn_at: f32,
    hit: HashSet<Entity>,
}

impl LightningStrike {
    #[inline]
    pub fn has_hit(&self, target: Entity) -> bool {
        self.hit.contains(&target)
    }
}

/// Everyone but the owner's team. Unknown owners strike both sides.
fn strike_mask(owner_team: Option<Team>) -> LayerMask {
    match owner_team {
        Some(team) => Layer::for_team(team.opposing()).into(),
        None => LayerMask::from([Layer::Player, Layer::Bot]),
    }
}

pub fn start_lightning(
    mut commands: Commands,
    virt: Res<Time<Virtual>>,
    mut hits: MessageReader<ProjectileHit>,
    mut stuck: MessageReader<ProjectileStuck>,
    q_observer: Query<&LightningOnHit>,
    q_teams: Query<&Team>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let now = clock::now(&virt);

    let landings = hits
        .read()
        .map(|h| (h.projectile, h.owner, h.point, true))
        .chain(stuck.read().map(|s| (s.projectile, s.owner, s.point, false)));

    for (projectile, owner, point, on_body) in landings {
        let Ok(spec) = q_observer.get(projectile) else {
            continue;
        };
        if !seen.insert(projectile) {
            continue;
        }

        let owner_team = owner.and_then(|o| q_teams.get(o).ok().copied());
        let mut spec = spec.clone();
        spec.strike_count = spec.strike_count.max(1);
        let depth = spec.ground_probe;
        let mut ec = commands.spawn((
            Name::new("LightningSequence"),
            LightningSequence {
                anchor: point,
                spec,
                fired: 0,
                next_at: now,
                owner,
                hit_mask: strike_mask(owner_team),
            },
            DespawnOnExit(GameState::InGame),
        ));
        if on_body {
            ec.insert(SnapToGround { depth });
        }
    }
}

/// Drops body-hit anchors onto the ground below, when there is ground within reach.
pub fn snap_sequences_to_ground(
    mut commands: Commands,
    spatial: SpatialQuery,
    mut q: Query<(Entity, &mut LightningSequence, &SnapToGround)>,
) {
    let filter = SpatialQueryFilter::from_mask(Layer::Ground);
    for (e, mut seq, snap) in &mut q {
        if let Some(hit) = spatial.cast_ray(seq.anchor, Dir2::NEG_Y, snap.depth, true, &filter) {
            seq.anchor.y -= hit.distance;
        }
        commands.entity(e).remove::<SnapToGround>();
    }
}

pub fn run_lightning_sequences(
    mut commands: Commands,
    virt: Res<Time<Virtual>>,
    mut q: Query<(Entity, &mut LightningSequence), Without<SnapToGround>>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&virt);

    for (e, mut seq) in &mut q {
        let mut fired_now = 0;
        while seq.fired < seq.spec.strike_count
            && now >= seq.next_at
            && fired_now < MAX_STRIKES_PER_TICK
        {
            let at = seq.anchor + seq.spec.spawn_offset;
            commands.spawn((
                Name::new("LightningStrike"),
                LightningStrike {
                    damage: seq.spec.damage,
                    radius: seq.spec.radius.max(0.0),
                    hit_mask: seq.hit_mask,
                    owner: seq.owner,
                    despawn_at: now + seq.spec.strike_lifetime.max(0.0),
                    hit: HashSet::new(),
                },
                Transform::from_translation(at.extend(2.0)),
                DespawnOnExit(GameState::InGame),
            ));
            cues.write(Cue::new(CueKind::Lightning, at));

            seq.fired += 1;
            seq.next_at += seq.spec.interval.max(MIN_INTERVAL);
            fired_now += 1;
        }

        if seq.fired >= seq.spec.strike_count {
            commands.entity(e).despawn();
        }
    }
}

/// Each strike damages every opposing target inside its radius at most once.
#[allow(clippy::type_complexity)]
pub fn apply_strikes(
    mut commands: Commands,
    virt: Res<Time<Virtual>>,
    mut q_strikes: Query<(Entity, &mut LightningStrike, &Transform)>,
    q_targets: Query<(Entity, &CollisionLayers, Option<&ColliderAabb>, &Transform), With<Health>>,
    mut sink: DamageSink,
) {
    let now = clock::now(&virt);

    for (e, mut strike, tf) in &mut q_strikes {
        let center = tf.translation.truncate();

        for (target, layers, aabb, target_tf) in &q_targets {
            if strike.owner == Some(target) || strike.hit.contains(&target) {
                continue;
            }
            if (layers.memberships & strike.hit_mask) == LayerMask::NONE {
                continue;
            }
            let closest = aabb.map_or(target_tf.translation.truncate(), |b| {
                center.clamp(b.min, b.max)
            });
            if closest.distance(center) > strike.radius {
                continue;
            }
            // Invulnerable targets get another chance while the strike lasts.
            if sink.apply(target, strike.damage) > 0.0 {
                strike.hit.insert(target);
            }
        }

        if now >= strike.despawn_at {
            commands.entity(e).despawn();
        }
    }
}
