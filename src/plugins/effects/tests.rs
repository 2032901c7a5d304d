use avian2d::prelude::*;
use bevy::prelude::*;

use super::freeze::{self, FreezeOnHit, IcePillar};
use super::lightning::{self, LightningOnHit, LightningSequence, LightningStrike, SnapToGround};
use crate::common::layers::Layer;
use crate::common::team::Team;
use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once, set_clock};
use crate::plugins::actors::freeze::FreezeRequest;
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::health::{Died, Health, HealthChanged};
use crate::plugins::projectiles::messages::{ProjectileHit, ProjectileStuck};

fn world_at(now: f32) -> World {
    let mut world = World::new();
    set_clock(&mut world, now, 0.02);
    ensure_messages::<ProjectileHit>(&mut world);
    ensure_messages::<ProjectileStuck>(&mut world);
    ensure_messages::<FreezeRequest>(&mut world);
    ensure_messages::<Cue>(&mut world);
    ensure_messages::<HealthChanged>(&mut world);
    ensure_messages::<Died>(&mut world);
    world
}

fn hit(projectile: Entity, owner: Option<Entity>, target: Entity, point: Vec2) -> ProjectileHit {
    ProjectileHit { projectile, owner, target, point, damage: 10.0 }
}

fn stuck(projectile: Entity, owner: Option<Entity>, point: Vec2) -> ProjectileStuck {
    ProjectileStuck { projectile, owner, point, normal: Vec2::Y }
}

fn body(world: &mut World, team: Team, at: Vec2, invulnerability: f32) -> Entity {
    world
        .spawn((
            team,
            Health::new(100.0, invulnerability),
            CollisionLayers::new(Layer::for_team(team), LayerMask::ALL),
            ColliderAabb { min: at - Vec2::splat(0.5), max: at + Vec2::splat(0.5) },
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

fn health(world: &World, e: Entity) -> f32 {
    world.get::<Health>(e).unwrap().current()
}

fn set_now(world: &mut World, now: f32) {
    set_clock(world, now, 0.02);
}

#[test]
fn freeze_hit_requests_a_locking_freeze_and_an_overlay() {
    let mut world = world_at(0.0);
    let arrow = world.spawn(FreezeOnHit { seconds: 0.0, ..default() }).id();
    let plain = world.spawn_empty().id();
    let target = world.spawn_empty().id();

    world.write_message(hit(arrow, None, target, Vec2::new(1.0, 2.0)));
    world.write_message(hit(plain, None, target, Vec2::ZERO));
    run_system_once(&mut world, freeze::freeze_on_hit);

    let requests = drain_messages::<FreezeRequest>(&mut world);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, target);
    assert!(requests[0].lock_movement);
    assert!(requests[0].seconds > 0.0);

    let cues = drain_messages::<Cue>(&mut world);
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].kind, CueKind::FreezeOverlay);
    assert_eq!(cues[0].source, Some(target));
}

#[test]
fn ice_pillar_rises_then_enables_its_collider_then_expires() {
    let mut world = world_at(0.0);
    let arrow = world.spawn(FreezeOnHit::default()).id();
    world.write_message(stuck(arrow, None, Vec2::ZERO));
    run_system_once(&mut world, freeze::spawn_ice_pillars);
    assert_eq!(drain_messages::<Cue>(&mut world)[0].kind, CueKind::IcePillar);

    let pillar = world
        .query_filtered::<Entity, With<IcePillar>>()
        .single(&world)
        .unwrap();
    assert!(world.get::<ColliderDisabled>(pillar).is_some());
    let tf = *world.get::<Transform>(pillar).unwrap();
    assert!((tf.translation.y - 0.02).abs() < 1e-5);
    assert!((tf.scale.y - 0.01).abs() < 1e-5);

    set_now(&mut world, 0.1);
    run_system_once(&mut world, freeze::grow_ice_pillars);
    let mid = world.get::<Transform>(pillar).unwrap().scale.y;
    assert!(mid > 0.01 && mid < 2.0);
    assert!(world.get::<ColliderDisabled>(pillar).is_some());

    set_now(&mut world, 0.3);
    run_system_once(&mut world, freeze::grow_ice_pillars);
    let tf = *world.get::<Transform>(pillar).unwrap();
    assert!((tf.scale.y - 2.0).abs() < 1e-4);
    // Centred pivot: the base stays put while the pillar grows upward.
    assert!((tf.translation.y - (0.02 + 1.99 * 0.5)).abs() < 1e-4);
    assert!(world.get::<ColliderDisabled>(pillar).is_none());

    set_now(&mut world, 2.5);
    run_system_once(&mut world, freeze::grow_ice_pillars);
    assert!(world.get_entity(pillar).is_err());
}

#[test]
fn arrows_without_a_pillar_spec_leave_nothing_behind() {
    let mut world = world_at(0.0);
    let arrow = world.spawn(FreezeOnHit { pillar: None, ..default() }).id();
    world.write_message(stuck(arrow, None, Vec2::ZERO));
    run_system_once(&mut world, freeze::spawn_ice_pillars);

    let count = world.query::<&IcePillar>().iter(&world).count();
    assert_eq!(count, 0);
}

#[test]
fn lightning_body_hit_waits_for_ground_snap_but_stick_does_not() {
    let mut world = world_at(0.0);
    let owner = world.spawn(Team::Player).id();
    let arrow = world.spawn(LightningOnHit::default()).id();
    let target = world.spawn_empty().id();

    world.write_message(hit(arrow, Some(owner), target, Vec2::new(0.0, 1.0)));
    world.write_message(stuck(arrow, Some(owner), Vec2::ZERO));
    run_system_once(&mut world, lightning::start_lightning);

    // Same arrow in the same run starts one sequence.
    let seqs: Vec<_> = world
        .query::<(&LightningSequence, Has<SnapToGround>)>()
        .iter(&world)
        .map(|(s, snap)| (s.anchor, s.hit_mask, snap))
        .collect();
    assert_eq!(seqs.len(), 1);
    assert_eq!(seqs[0].0, Vec2::new(0.0, 1.0));
    assert_eq!(seqs[0].1, LayerMask::from(Layer::Bot));
    assert!(seqs[0].2);
}

#[test]
fn sequence_strikes_on_interval_then_ends() {
    let mut world = world_at(0.0);
    let arrow = world.spawn(LightningOnHit::default()).id();
    world.write_message(stuck(arrow, None, Vec2::new(3.0, 0.0)));
    run_system_once(&mut world, lightning::start_lightning);
    drain_messages::<ProjectileStuck>(&mut world);

    run_system_once(&mut world, lightning::run_lightning_sequences);
    let strikes = |world: &mut World| world.query::<&LightningStrike>().iter(world).count();
    assert_eq!(strikes(&mut world), 1);
    assert_eq!(drain_messages::<Cue>(&mut world)[0].kind, CueKind::Lightning);

    set_now(&mut world, 0.5);
    run_system_once(&mut world, lightning::run_lightning_sequences);
    assert_eq!(strikes(&mut world), 1);

    set_now(&mut world, 1.0);
    run_system_once(&mut world, lightning::run_lightning_sequences);
    assert_eq!(strikes(&mut world), 2);
    assert_eq!(world.query::<&LightningSequence>().iter(&world).count(), 0);
}

fn spawn_strike(world: &mut World, at: Vec2, owner: Option<Entity>, mask: LayerMask) -> Entity {
    world.spawn(LightningSequence {
        anchor: at,
        spec: LightningOnHit { strike_count: 1, spawn_offset: Vec2::ZERO, ..default() },
        fired: 0,
        next_at: 0.0,
        owner,
        hit_mask: mask,
    });
    run_system_once(world, lightning::run_lightning_sequences);
    world
        .query_filtered::<Entity, With<LightningStrike>>()
        .single(world)
        .unwrap()
}

#[test]
fn strike_damages_each_opponent_in_range_once() {
    let mut world = world_at(0.0);
    let owner = body(&mut world, Team::Player, Vec2::new(0.5, 0.5), 0.0);
    let near = body(&mut world, Team::Bot, Vec2::new(1.2, 0.5), 0.0);
    let far = body(&mut world, Team::Bot, Vec2::new(6.0, 0.5), 0.0);
    let ally = body(&mut world, Team::Player, Vec2::new(-0.5, 0.5), 0.0);

    let strike = spawn_strike(&mut world, Vec2::ZERO, Some(owner), LayerMask::from(Layer::Bot));
    run_system_once(&mut world, lightning::apply_strikes);
    set_now(&mut world, 0.1);
    run_system_once(&mut world, lightning::apply_strikes);

    assert_eq!(health(&world, near), 50.0);
    assert_eq!(health(&world, far), 100.0);
    assert_eq!(health(&world, ally), 100.0);
    assert_eq!(health(&world, owner), 100.0);
    assert!(world.get::<LightningStrike>(strike).unwrap().has_hit(near));

    set_now(&mut world, 0.5);
    run_system_once(&mut world, lightning::apply_strikes);
    assert!(world.get_entity(strike).is_err());
}

#[test]
fn invulnerable_target_is_retried_while_the_strike_lasts() {
    let mut world = world_at(0.0);
    let target = body(&mut world, Team::Bot, Vec2::new(0.0, 0.5), 0.3);
    world.get_mut::<Health>(target).unwrap().apply(10.0, 0.0);

    let both = LayerMask::from([Layer::Player, Layer::Bot]);
    let strike = spawn_strike(&mut world, Vec2::ZERO, None, both);
    run_system_once(&mut world, lightning::apply_strikes);
    assert_eq!(health(&world, target), 90.0);
    assert!(!world.get::<LightningStrike>(strike).unwrap().has_hit(target));

    set_now(&mut world, 0.35);
    run_system_once(&mut world, lightning::apply_strikes);
    assert_eq!(health(&world, target), 40.0);
}
