//! Discrete collision resolve for flying projectiles.
//!
//! Runs after the swept ground check, so a projectile already stuck this tick is skipped.
//! Start events come first, then targets the projectile already overlaps.
//! At most one resolution per projectile per tick (`seen`).

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::flight::{StickSite, stick_to_ground};
use super::messages::{ProjectileHit, ProjectileStuck};
use crate::common::{clock, layers::Layer, team::Team};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::health::DamageSink;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget { collider: ev.collider1, body: ev.body1 },
        CollisionTarget { collider: ev.collider2, body: ev.body2 },
    )
}

/// How a candidate contact reached the resolver this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    Started,
    /// Already touching when the projectile was (re)armed, so no start event follows.
    Overlapping,
}

/// Closest point on an axis-aligned box to `p`.
#[inline]
fn closest_point(aabb: Option<&ColliderAabb>, p: Vec2) -> Vec2 {
    aabb.map_or(p, |b| p.clamp(b.min, b.max))
}

/// Stick site from the deepest manifold point, with the normal pointing out of the ground.
/// Without contact data the projectile's own position and reversed velocity stand in.
pub(crate) fn ground_site(
    manifolds: &[ContactManifold],
    ground_is_first: bool,
    pos: Vec2,
    vel: Vec2,
) -> StickSite {
    let deepest = manifolds
        .iter()
        .filter_map(|m| m.find_deepest_contact().map(|c| (m.normal, c)))
        .max_by(|a, b| a.1.penetration.total_cmp(&b.1.penetration));

    match deepest {
        Some((normal, contact)) => StickSite {
            point: contact.point,
            normal: if ground_is_first { normal } else { -normal },
        },
        None => StickSite {
            point: pos,
            normal: (-vel).normalize_or(Vec2::Y),
        },
    }
}

#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn resolve_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    time: Res<Time<Virtual>>,
    collisions: Collisions,
    q_is_projectile: Query<(), With<PooledProjectile>>,
    q_overlapping: Query<(Entity, &CollidingEntities), With<PooledProjectile>>,
    q_collider_of: Query<&ColliderOf>,
    mut q_projectiles: Query<
        (
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
    q_others: Query<(&CollisionLayers, Option<&ColliderAabb>), Without<PooledProjectile>>,
    q_team: Query<&Team>,
    mut sink: DamageSink,
    mut hits: MessageWriter<ProjectileHit>,
    mut stuck: MessageWriter<ProjectileStuck>,
    mut cues: MessageWriter<Cue>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let now = clock::now(&time);

    let mut candidates: Vec<(Entity, CollisionTarget, Contact)> = Vec::new();
    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue;
        }
        let (proj_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };
        candidates.push((proj_side.collider, other_side, Contact::Started));
    }
    for (e, colliding) in &q_overlapping {
        for &other in colliding.iter() {
            let body = q_collider_of.get(other).ok().map(|c| c.body);
            candidates.push((e, CollisionTarget { collider: other, body }, Contact::Overlapping));
        }
    }

    for (e, other_side, contact) in candidates {
        if seen.contains(&e) {
            continue;
        }
        let Ok((other_layers, other_aabb)) = q_others.get(other_side.collider) else {
            continue;
        };
        let Ok((mut projectile, mut state, mut tf, mut pos, mut vel, mut body, mut layers)) =
            q_projectiles.get_mut(e)
        else {
            continue;
        };
        if *state != ProjectileState::Flying {
            continue;
        }

        // GROUND: discrete fallback when the sweep missed.
        if other_layers.memberships.has_all(Layer::Ground) {
            if contact == Contact::Overlapping {
                continue;
            }
            seen.insert(e);
            let site = match collisions.get(e, other_side.collider) {
                Some(pair) => ground_site(
                    &pair.manifolds,
                    pair.collider1 == other_side.collider,
                    pos.0,
                    vel.0,
                ),
                None => ground_site(&[], false, pos.0, vel.0),
            };
            stick_to_ground(
                e, site, now, &mut projectile, &mut state, &mut tf, &mut pos, &mut vel, &mut body,
                &mut layers, &mut stuck, &mut cues,
            );
            continue;
        }

        // DAMAGEABLE: exclusion, armed, mask, then damage.
        let root = other_side.gameplay_owner();
        if projectile.excludes(root, q_team.get(root).ok().copied()) {
            continue;
        }
        if !projectile.armed {
            continue;
        }
        if projectile.hit_mask != LayerMask::NONE
            && (other_layers.memberships & projectile.hit_mask) == LayerMask::NONE
        {
            continue;
        }
        seen.insert(e);

        let applied = sink.apply(root, projectile.damage);
        let point = closest_point(other_aabb, pos.0);

        projectile.disarm();
        *state = ProjectileState::PendingReturn;

        hits.write(ProjectileHit {
            projectile: e,
            owner: projectile.owner,
            target: root,
            point,
            damage: applied,
        });
        cues.write(Cue::new(CueKind::Hit, point));
        debug!("{e:?} hit {root:?} for {applied}");
    }
}
