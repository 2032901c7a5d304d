use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once, set_clock};

fn world_with_library(dt: f32) -> World {
    let mut world = World::new();
    set_clock(&mut world, 0.0, dt);
    ensure_messages::<AnimationEvent>(&mut world);
    let mut lib = ClipLibrary::with_basic_attack();
    lib.insert(
        "Skill",
        Clip::new(names::SKILL_TAG, 0.5)
            .with_event(0.1, AnimationEventKind::AttackImpact)
            .with_event(0.4, AnimationEventKind::SkillEnd),
    );
    world.insert_resource(lib);
    world
}

fn kinds(world: &mut World) -> Vec<AnimationEventKind> {
    drain_messages::<AnimationEvent>(world).into_iter().map(|e| e.kind).collect()
}

#[test]
fn reset_then_set_keeps_a_single_trigger() {
    let mut a = Animator::default();
    a.set_trigger("Fire");
    a.set_trigger("Fire");
    a.reset_trigger("Fire");
    assert!(!a.has_trigger("Fire"));
    a.set_trigger("Fire");
    assert!(a.has_trigger("Fire"));
}

#[test]
fn attack_clip_emits_impact_once_then_returns_to_locomotion() {
    let mut world = world_with_library(0.2);
    let mut animator = Animator::default();
    animator.set_trigger(names::ATTACK_TRIGGER);
    let e = world.spawn((animator, ClipPlayer::default())).id();

    run_system_once(&mut world, play_clips);
    assert!(world.get::<Animator>(e).unwrap().is_in_tag(names::ATTACK_TAG));
    assert!(kinds(&mut world).is_empty());

    run_system_once(&mut world, play_clips);
    assert_eq!(kinds(&mut world), vec![AnimationEventKind::AttackImpact]);

    for _ in 0..3 {
        run_system_once(&mut world, play_clips);
    }
    assert!(kinds(&mut world).is_empty());
    assert_eq!(world.get::<Animator>(e).unwrap().state_tag(), None);
}

#[test]
fn skill_trigger_preempts_attack_clip() {
    let mut world = world_with_library(0.05);
    let mut animator = Animator::default();
    animator.set_trigger(names::ATTACK_TRIGGER);
    let e = world.spawn((animator, ClipPlayer::default())).id();
    run_system_once(&mut world, play_clips);

    world.get_mut::<Animator>(e).unwrap().set_trigger("Skill");
    run_system_once(&mut world, play_clips);
    assert_eq!(world.get::<ClipPlayer>(e).unwrap().playing(), Some("Skill"));
    assert!(world.get::<Animator>(e).unwrap().is_in_tag(names::SKILL_TAG));
}

#[test]
fn zero_speed_holds_the_clip() {
    let mut world = world_with_library(0.2);
    let mut animator = Animator::default();
    animator.set_trigger("Skill");
    animator.set_speed(0.0);
    let e = world.spawn((animator, ClipPlayer::default())).id();

    for _ in 0..10 {
        run_system_once(&mut world, play_clips);
    }
    assert!(kinds(&mut world).is_empty());
    assert_eq!(world.get::<ClipPlayer>(e).unwrap().playing(), Some("Skill"));
}

#[test]
fn crossfade_abandons_the_running_clip() {
    let mut world = world_with_library(0.05);
    let mut animator = Animator::default();
    animator.set_trigger("Skill");
    let e = world.spawn((animator, ClipPlayer::default())).id();
    run_system_once(&mut world, play_clips);

    world.get_mut::<Animator>(e).unwrap().crossfade(names::LOCOMOTION);
    for _ in 0..20 {
        run_system_once(&mut world, play_clips);
    }
    assert!(kinds(&mut world).is_empty());
    assert_eq!(world.get::<ClipPlayer>(e).unwrap().playing(), None);
}
