//! Projectiles plugin tests, **deterministic**.
//!
//! These tests avoid relying on the full physics pipeline to generate collisions.
//! Instead, they **inject `CollisionStart` messages directly** and then run the
//! projectile systems once. The swept ground check is the exception: it needs a real
//! physics step for `SpatialQuery`, so it runs in a small `App`.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState, PrototypeId, stick_pose};
use super::messages::{ProjectileHit, ProjectileStuck};
use super::pool::{ObjectPool, PoolSet, ProjectilePools};
use super::prototypes::{self, ProjectilePrototypes};
use super::shooter::{self, FireRequest, Shooter, launch_velocity};
use super::{collision, commit, flight};
use crate::common::clock::Deadline;
use crate::common::layers::Layer;
use crate::common::team::Team;
use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once, set_clock};
use crate::common::tunables::ProjectileTunables;
use crate::plugins::cues::Cue;
use crate::plugins::health::{Died, Health, HealthChanged};

// --------------------------------------------------------------------------------------
// Helpers
// --------------------------------------------------------------------------------------

fn base_world(now: f32) -> World {
    let mut world = World::new();
    set_clock(&mut world, now, 1.0 / 64.0);
    world.insert_resource(Gravity(Vec2::new(0.0, -9.8)));
    world.insert_resource(ProjectilePrototypes::default());
    world.insert_resource(ProjectilePools::new(12));
    world.init_resource::<ContactGraph>();
    ensure_messages::<FireRequest>(&mut world);
    ensure_messages::<Cue>(&mut world);
    ensure_messages::<CollisionStart>(&mut world);
    ensure_messages::<ProjectileHit>(&mut world);
    ensure_messages::<ProjectileStuck>(&mut world);
    ensure_messages::<HealthChanged>(&mut world);
    ensure_messages::<Died>(&mut world);
    world
}

fn spawn_shooter(world: &mut World, at: Vec2) -> Entity {
    let mut shooter = Shooter::from_tunables(&ProjectileTunables::default(), Layer::Bot);
    shooter.fire_offset = Vec2::ZERO;
    world
        .spawn((shooter, Team::Player, GlobalTransform::from_translation(at.extend(0.0))))
        .id()
}

/// A flying projectile owned by `owner`, positioned at `at`.
fn spawn_flying(world: &mut World, owner: Entity, at: Vec2, vel: Vec2) -> Entity {
    let mut p = Projectile::inactive(PrototypeId::new(prototypes::ARROW));
    p.armed = true;
    p.damage = 10.0;
    p.owner = Some(owner);
    p.owner_team = Some(Team::Player);
    p.hit_mask = Layer::Bot.into();
    p.return_at = Deadline::at(2.5);
    p.prev_pos = at;
    world
        .spawn((
            PooledProjectile,
            p,
            ProjectileState::Flying,
            Transform::from_translation(at.extend(2.0)),
            Position(at),
            LinearVelocity(vel),
            RigidBody::Dynamic,
            GravityScale(1.0),
            Visibility::Visible,
            CollisionLayers::new(Layer::Projectile, [Layer::Ground, Layer::Bot]),
        ))
        .id()
}

fn collide(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionStart { collider1: a, collider2: b, body1: None, body2: None });
}

// --------------------------------------------------------------------------------------
// Pool
// --------------------------------------------------------------------------------------

#[test]
fn pool_grows_on_demand_and_keeps_growth() {
    let mut next = 0u32;
    let mut pool = ObjectPool::warmed(12, || {
        next += 1;
        next
    });
    assert_eq!(pool.free_count(), 12);

    let mut taken = Vec::new();
    for _ in 0..15 {
        let n = taken.len() as u32;
        let item = pool.acquire(|| 1000 + n);
        taken.push(item);
    }
    assert_eq!(taken.len(), 15);
    assert_eq!(pool.created(), 15);
    assert_eq!(pool.free_count(), 0);

    for item in taken {
        pool.release(item);
    }
    assert_eq!(pool.free_count(), 15);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn override_pools_are_created_lazily_with_the_same_warm_size() {
    let mut set: PoolSet<&'static str, u32> = PoolSet::new(4);
    assert!(set.is_empty());

    let _ = set.acquire(&"freeze", || 7);
    let pool = set.get(&"freeze").expect("pool created on first use");
    assert_eq!(pool.created(), 4);
    assert_eq!(pool.free_count(), 3);
    assert_eq!(set.len(), 1);
}

// --------------------------------------------------------------------------------------
// Ballistic solve
// --------------------------------------------------------------------------------------

#[test]
fn launch_velocity_passes_through_target_at_flight_time() {
    let (t, g) = (0.8, 9.8);
    let v = launch_velocity(Vec2::ZERO, Vec2::new(5.0, 0.0), t, g);
    assert!((v.x - 6.25).abs() < 1e-3);
    assert!((v.y - 3.92).abs() < 1e-3);

    let landed = Vec2::new(v.x * t, v.y * t - 0.5 * g * t * t);
    assert!(landed.distance(Vec2::new(5.0, 0.0)) < 1e-3);
}

#[test]
fn launch_velocity_clamps_tiny_flight_times() {
    let fast = launch_velocity(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.01, 0.0);
    assert!((fast.x - 10.0).abs() < 1e-4);
}

#[test]
fn stick_pose_insets_along_the_normal_and_faces_into_the_surface() {
    let (pos, angle) = stick_pose(Vec2::new(2.0, 0.0), Vec2::Y, 0.0);
    assert!((pos - Vec2::new(2.0, -0.01)).length() < 1e-6);
    assert!((angle + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
}

// --------------------------------------------------------------------------------------
// Shooter allocator + commit
// --------------------------------------------------------------------------------------

#[test]
fn fifteen_shots_from_a_pool_of_twelve_all_fly_then_all_return() {
    let mut world = base_world(0.0);
    run_system_once(&mut world, shooter::prewarm_default_pool);
    assert_eq!(world.query::<&PooledProjectile>().iter(&world).count(), 12);

    let shooter_e = spawn_shooter(&mut world, Vec2::ZERO);
    for _ in 0..15 {
        world.write_message(FireRequest::at(shooter_e, Vec2::new(5.0, 0.0)));
    }
    run_system_once(&mut world, shooter::fire_projectiles);

    let flying: Vec<_> = world
        .query::<(&ProjectileState, &LinearVelocity, &Projectile)>()
        .iter(&world)
        .filter(|(s, _, _)| **s == ProjectileState::Flying)
        .map(|(_, v, p)| (v.0, p.owner))
        .collect();
    assert_eq!(flying.len(), 15);
    for (v, owner) in &flying {
        assert!((v.x - 6.25).abs() < 1e-3);
        assert!((v.y - 3.92).abs() < 1e-3);
        assert_eq!(*owner, Some(shooter_e));
    }

    let arrow = PrototypeId::new(prototypes::ARROW);
    assert_eq!(world.resource::<ProjectilePools>().get(&arrow).unwrap().created(), 15);

    for mut state in world.query::<&mut ProjectileState>().iter_mut(&mut world) {
        *state = ProjectileState::PendingReturn;
    }
    run_system_once(&mut world, commit::return_to_pool_commit);

    let pools = world.resource::<ProjectilePools>();
    assert_eq!(pools.get(&arrow).unwrap().free_count(), 15);
    assert!(
        world
            .query::<&ProjectileState>()
            .iter(&world)
            .all(|s| *s == ProjectileState::Inactive)
    );
}

#[test]
fn shot_without_shooter_is_skipped() {
    let mut world = base_world(0.0);
    let nobody = world.spawn_empty().id();
    world.write_message(FireRequest::at(nobody, Vec2::X));
    run_system_once(&mut world, shooter::fire_projectiles);
    assert_eq!(world.query::<&PooledProjectile>().iter(&world).count(), 0);
}

#[test]
fn override_prototype_gets_its_own_pool_and_observer_components() {
    let mut world = base_world(0.0);
    let shooter_e = spawn_shooter(&mut world, Vec2::ZERO);
    let freeze = PrototypeId::new(prototypes::FREEZE_ARROW);
    world.write_message(FireRequest::at(shooter_e, Vec2::X).with_prototype(Some(freeze.clone())));
    run_system_once(&mut world, shooter::fire_projectiles);

    let pools = world.resource::<ProjectilePools>();
    assert_eq!(pools.get(&freeze).unwrap().created(), 12);
    assert_eq!(
        world
            .query::<&crate::plugins::effects::freeze::FreezeOnHit>()
            .iter(&world)
            .count(),
        12
    );
}

// --------------------------------------------------------------------------------------
// Collision resolve
// --------------------------------------------------------------------------------------

#[test]
fn armed_hit_damages_target_and_returns_immediately() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let target = world
        .spawn((
            Team::Bot,
            Health::new(100.0, 0.0),
            CollisionLayers::new(Layer::Bot, [Layer::Projectile]),
        ))
        .id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);

    collide(&mut world, p, target);
    collide(&mut world, target, p);
    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(world.get::<Health>(target).unwrap().current(), 90.0);
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::PendingReturn);
    let proj = world.get::<Projectile>(p).unwrap();
    assert!(!proj.armed);
    assert!(!proj.return_at.is_armed());

    let hits = drain_messages::<ProjectileHit>(&mut world);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, target);
    assert_eq!(hits[0].damage, 10.0);
}

#[test]
fn shot_never_damages_its_owner_or_team() {
    let mut world = base_world(1.0);
    let owner = world
        .spawn((
            Team::Player,
            Health::new(100.0, 0.0),
            CollisionLayers::new(Layer::Player, [Layer::Projectile]),
        ))
        .id();
    let mate = world
        .spawn((
            Team::Player,
            Health::new(100.0, 0.0),
            CollisionLayers::new(Layer::Bot, [Layer::Projectile]),
        ))
        .id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);

    collide(&mut world, p, owner);
    collide(&mut world, p, mate);
    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(world.get::<Health>(owner).unwrap().current(), 100.0);
    assert_eq!(world.get::<Health>(mate).unwrap().current(), 100.0);
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::Flying);
}

#[test]
fn ground_contact_sticks_and_replaces_the_flight_deadline() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let ground = world.spawn(CollisionLayers::new(Layer::Ground, [Layer::Projectile])).id();
    let p = spawn_flying(&mut world, owner, Vec2::new(3.0, 0.0), Vec2::new(2.0, -4.0));

    collide(&mut world, p, ground);
    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::Stuck);
    let proj = world.get::<Projectile>(p).unwrap();
    assert!(!proj.armed);
    assert_eq!(proj.return_at.get(), Some(1.0 + proj.stick_lifetime));
    assert_eq!(world.get::<LinearVelocity>(p).unwrap().0, Vec2::ZERO);
    assert!(matches!(world.get::<RigidBody>(p).unwrap(), RigidBody::Kinematic));
    assert_eq!(drain_messages::<ProjectileStuck>(&mut world).len(), 1);
}

#[test]
fn ground_stick_takes_point_and_normal_from_the_contact_manifold() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let wall = world.spawn(CollisionLayers::new(Layer::Ground, [Layer::Projectile])).id();
    // Moving mostly down into a wall that faces +X.
    let p = spawn_flying(&mut world, owner, Vec2::new(-0.1, 1.0), Vec2::new(1.0, -6.0));

    // Manifold normal points from the projectile (first) into the wall.
    world.resource_mut::<ContactGraph>().add_edge_with(ContactEdge::new(p, wall), |pair| {
        pair.manifolds.push(ContactManifold::new(
            [ContactPoint::new(Vec2::ZERO, Vec2::ZERO, Vec2::new(0.0, 1.0), 0.05)],
            Vec2::NEG_X,
        ));
    });
    collide(&mut world, p, wall);
    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::Stuck);
    let events = drain_messages::<ProjectileStuck>(&mut world);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].point, Vec2::new(0.0, 1.0));
    assert_eq!(events[0].normal, Vec2::X);
}

#[test]
fn ground_site_orients_the_normal_out_of_the_ground_either_way_round() {
    let manifold = ContactManifold::new(
        [
            ContactPoint::new(Vec2::ZERO, Vec2::ZERO, Vec2::new(1.0, 0.0), 0.01),
            ContactPoint::new(Vec2::ZERO, Vec2::ZERO, Vec2::new(2.0, 0.0), 0.04),
        ],
        Vec2::Y,
    );

    let ground_first = collision::ground_site(std::slice::from_ref(&manifold), true, Vec2::ZERO, Vec2::X);
    assert_eq!(ground_first.normal, Vec2::Y);
    assert_eq!(ground_first.point, Vec2::new(2.0, 0.0));

    let projectile_first =
        collision::ground_site(std::slice::from_ref(&manifold), false, Vec2::ZERO, Vec2::X);
    assert_eq!(projectile_first.normal, Vec2::NEG_Y);

    let fallback = collision::ground_site(&[], false, Vec2::new(4.0, 0.0), Vec2::new(0.0, -3.0));
    assert_eq!(fallback.point, Vec2::new(4.0, 0.0));
    assert_eq!(fallback.normal, Vec2::Y);
}

#[test]
fn armed_shot_hits_a_target_it_already_overlaps() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let target = world
        .spawn((
            Team::Bot,
            Health::new(100.0, 0.0),
            CollisionLayers::new(Layer::Bot, [Layer::Projectile]),
        ))
        .id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);
    world.entity_mut(p).insert(CollidingEntities([target].into_iter().collect()));

    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(world.get::<Health>(target).unwrap().current(), 90.0);
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::PendingReturn);
    assert_eq!(drain_messages::<ProjectileHit>(&mut world).len(), 1);
}

#[test]
fn overlap_and_start_event_on_one_tick_hit_once() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let target = world
        .spawn((
            Team::Bot,
            Health::new(100.0, 0.0),
            CollisionLayers::new(Layer::Bot, [Layer::Projectile]),
        ))
        .id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);
    world.entity_mut(p).insert(CollidingEntities([target].into_iter().collect()));

    collide(&mut world, p, target);
    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(world.get::<Health>(target).unwrap().current(), 90.0);
    assert_eq!(drain_messages::<ProjectileHit>(&mut world).len(), 1);
}

#[test]
fn resting_ground_overlap_alone_does_not_stick() {
    let mut world = base_world(1.0);
    let owner = world.spawn(Team::Player).id();
    let ground = world.spawn(CollisionLayers::new(Layer::Ground, [Layer::Projectile])).id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);
    world.entity_mut(p).insert(CollidingEntities([ground].into_iter().collect()));

    run_system_once(&mut world, collision::resolve_projectile_collisions);

    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::Flying);
    assert!(drain_messages::<ProjectileStuck>(&mut world).is_empty());
}

#[test]
fn deadlines_move_flying_and_stuck_projectiles_to_pending_return() {
    let mut world = base_world(3.0);
    let owner = world.spawn_empty().id();
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::X);

    run_system_once(&mut world, flight::expire_projectiles);
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::PendingReturn);
    assert!(!world.get::<Projectile>(p).unwrap().armed);
}

// --------------------------------------------------------------------------------------
// Swept ground check (full physics step)
// --------------------------------------------------------------------------------------

const STEP: f32 = 1.0 / 64.0;

/// Minimal app with avian stepping at a fixed rate and the sweep right after writeback.
fn physics_app() -> App {
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        AssetPlugin::default(),
        bevy::scene::ScenePlugin,
        bevy::mesh::MeshPlugin,
        PhysicsPlugins::default(),
    ));
    app.insert_resource(Gravity(Vec2::ZERO));
    app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f32(STEP)));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(STEP)));
    app.add_message::<ProjectileStuck>().add_message::<Cue>();
    app.add_systems(FixedPostUpdate, flight::sweep_ground.after(PhysicsSystems::Writeback));
    app
}

#[test]
fn fast_shot_that_tunnels_through_the_floor_sticks_at_the_ray_hit() {
    let mut app = physics_app();
    app.finish();

    // Floor 0.1 thick with its top face at y = 0.
    app.world_mut().spawn((
        RigidBody::Static,
        Collider::rectangle(20.0, 0.1),
        Transform::from_xyz(0.0, -0.05, 0.0),
        CollisionLayers::new(Layer::Ground, [Layer::Projectile]),
    ));
    app.update();

    // One step covers ~1.2 units, far more than the floor is thick.
    let start = Vec2::new(1.5, 0.5);
    let owner = app.world_mut().spawn(Team::Player).id();
    let p = spawn_flying(app.world_mut(), owner, start, Vec2::new(0.0, -80.0));
    app.world_mut().entity_mut(p).insert((Collider::rectangle(0.4, 0.1), Sensor, GravityScale(0.0)));

    let mut stuck_at = None;
    for _ in 0..8 {
        app.update();
        if *app.world().get::<ProjectileState>(p).unwrap() == ProjectileState::Stuck {
            stuck_at = Some(app.world().resource::<Time<Virtual>>().elapsed_secs());
            break;
        }
    }
    let now = stuck_at.expect("projectile never stuck");

    let world = app.world_mut();
    let pos = world.get::<Position>(p).unwrap().0;
    assert!((pos - Vec2::new(1.5, -Projectile::STICK_INSET)).length() < 1e-3, "{pos:?}");
    assert_eq!(world.get::<LinearVelocity>(p).unwrap().0, Vec2::ZERO);

    let proj = world.get::<Projectile>(p).unwrap();
    assert!(!proj.armed);
    let deadline = proj.return_at.get().expect("stick deadline");
    assert!((deadline - (now + proj.stick_lifetime)).abs() < 1e-4);

    let events = drain_messages::<ProjectileStuck>(world);
    assert_eq!(events.len(), 1);
    assert!((events[0].point - Vec2::new(1.5, 0.0)).length() < 1e-3);
    assert!(events[0].normal.y > 0.99);
}

// --------------------------------------------------------------------------------------
// Orientation
// --------------------------------------------------------------------------------------

fn z_angle(q: Quat) -> f32 {
    q.to_euler(EulerRot::ZYX).0
}

#[test]
fn orientation_snaps_to_velocity_angle_without_lerp() {
    let mut world = base_world(1.0);
    let owner = world.spawn_empty().id();
    let vel = Vec2::new(-3.0, 4.0);
    let p = spawn_flying(&mut world, owner, Vec2::ZERO, vel);
    {
        let mut proj = world.get_mut::<Projectile>(p).unwrap();
        proj.orient.lerp_speed = 0.0;
        proj.orient.heading_offset = 0.25;
    }

    run_system_once(&mut world, flight::orient_to_velocity);

    let angle = z_angle(world.get::<Transform>(p).unwrap().rotation);
    assert!((angle - (vel.y.atan2(vel.x) + 0.25)).abs() < 1e-4, "{angle}");
}

#[test]
fn orientation_turns_part_way_per_tick_and_skips_disarmed_shots() {
    let mut world = base_world(1.0);
    let owner = world.spawn_empty().id();
    let turning = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::new(0.0, 5.0));
    let disarmed = spawn_flying(&mut world, owner, Vec2::ZERO, Vec2::new(0.0, 5.0));
    world.get_mut::<Projectile>(disarmed).unwrap().armed = false;

    run_system_once(&mut world, flight::orient_to_velocity);

    // 12/s over 1/64 s covers 0.1875 of the quarter turn.
    let angle = z_angle(world.get::<Transform>(turning).unwrap().rotation);
    let expected = std::f32::consts::FRAC_PI_2 * (12.0 / 64.0);
    assert!((angle - expected).abs() < 1e-3, "{angle}");
    assert_eq!(world.get::<Transform>(disarmed).unwrap().rotation, Quat::IDENTITY);
}
