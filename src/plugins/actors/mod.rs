//! Actors plugin: the character state machine and everything that feeds it.
//!
//! Flow per frame:
//! - FrameSet::Logic: resolve opponents, latch animation events, run freeze countdowns, then
//!   one logic tick per actor (skill requests, freeze endings, state update)
//! - TickSet::Act: one movement tick per actor
//!
//! State hooks only see an [`ActorCtx`]. Shots and cues they produce are collected in an
//! [`Outbox`] and written as messages once every actor has ticked.

use avian2d::prelude::*;
use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use crate::common::clock;
use crate::common::rng::CombatRng;
use crate::common::sets::{FrameSet, TickSet};
use crate::common::team::Team;
use crate::plugins::animation::{AnimationEvent, AnimationEventKind, Animator, names};
use crate::plugins::cues::{Cue, CueKind};
use crate::plugins::mover::MoveDriver;
use crate::plugins::physics::Grounded;
use crate::plugins::projectiles::shooter::{FireRequest, Shooter};
use crate::plugins::skills::SkillRequest;
use crate::plugins::skills::data::SkillKind;
use crate::plugins::skills::selector::SkillSelector;

pub mod components;
pub mod context;
pub mod freeze;
pub mod fsm;
pub mod spawn;
pub mod states;

use components::{Actor, AnimationLatches, Opponent};
use context::{ActorCtx, Outbox};
use freeze::{Freeze, FreezeEnded, FreezeRequest};
use fsm::{StateMachine, Transition};
use states::casting::CastingState;

type ActorQuery<'a> = (
    Entity,
    &'a mut StateMachine,
    &'a mut Actor,
    &'a mut AnimationLatches,
    &'a Transform,
    &'a mut LinearVelocity,
    Option<&'a Grounded>,
    Option<&'a Freeze>,
    Option<&'a Opponent>,
    Option<&'a mut MoveDriver>,
    Option<&'a mut Animator>,
    Option<&'a mut SkillSelector>,
    Has<Shooter>,
);

pub fn plugin(app: &mut App) {
    app.add_message::<FreezeRequest>()
        .add_message::<FreezeEnded>()
        .add_systems(
            Update,
            (
                resolve_opponents,
                latch_animation_events,
                freeze::tick_freezes,
                freeze::apply_freeze_requests,
                tick_logic,
            )
                .chain()
                .in_set(FrameSet::Logic),
        )
        .add_systems(FixedUpdate, tick_fixed.in_set(TickSet::Act));
}

/// Binds each unresolved [`Opponent`] to the first actor of the wanted team.
pub fn resolve_opponents(
    mut q_seekers: Query<(Entity, &mut Opponent)>,
    q_candidates: Query<(Entity, &Team), With<Actor>>,
) {
    for (entity, mut opponent) in &mut q_seekers {
        if opponent.target.is_some() {
            continue;
        }
        let found = q_candidates
            .iter()
            .find(|(candidate, team)| *candidate != entity && **team == opponent.seek);
        if let Some((target, _)) = found {
            opponent.target = Some(target);
            debug!("{entity:?} fights {target:?}");
        }
    }
}

pub fn latch_animation_events(
    virt: Res<Time<Virtual>>,
    mut events: MessageReader<AnimationEvent>,
    mut q: Query<(&Actor, &mut AnimationLatches, Option<&mut Animator>, &Transform)>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&virt);

    for ev in events.read() {
        let Ok((actor, mut latches, animator, tf)) = q.get_mut(ev.actor) else {
            continue;
        };
        match ev.kind {
            AnimationEventKind::AttackImpact => latches.set_impact(),
            AnimationEventKind::SkillEnd => {
                if actor.is_casting() {
                    latches.set_skill_end();
                }
            }
            AnimationEventKind::ChargeStart { seconds } => {
                if actor.casting != Some(SkillKind::MultiShot) {
                    continue;
                }
                cues.write(Cue::new(CueKind::Charge, tf.translation.truncate()).from(ev.actor));
                if let Some(mut animator) = animator {
                    animator.pause_for(now, seconds);
                }
            }
        }
    }
}

fn flush(out: &mut Outbox, shots: &mut MessageWriter<FireRequest>, cues: &mut MessageWriter<Cue>) {
    for shot in out.shots.drain(..) {
        shots.write(shot);
    }
    for cue in out.cues.drain(..) {
        cues.write(cue);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn tick_logic(
    time: Res<Time>,
    virt: Res<Time<Virtual>>,
    mut rng: ResMut<CombatRng>,
    mut requests: MessageReader<SkillRequest>,
    mut thawed: MessageReader<FreezeEnded>,
    mut q_actors: Query<ActorQuery>,
    q_positions: Query<&Transform>,
    mut shots: MessageWriter<FireRequest>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&virt);
    let dt = time.delta_secs();

    let mut pending: HashMap<Entity, Vec<String>> = HashMap::default();
    for req in requests.read() {
        pending.entry(req.actor).or_default().push(req.skill_id.clone());
    }
    let thawed: HashSet<Entity> = thawed.read().map(|ev| ev.entity).collect();

    let mut out = Outbox::default();
    for (
        entity,
        mut machine,
        mut actor,
        mut latches,
        tf,
        mut vel,
        grounded,
        freeze,
        opponent,
        mut driver,
        mut animator,
        mut selector,
        has_shooter,
    ) in &mut q_actors
    {
        let grounded = grounded.is_some_and(|g| g.0);
        if let Some(animator) = animator.as_deref_mut() {
            animator.set_bool(names::IS_GROUNDED, grounded);
        }

        let mut ctx = ActorCtx {
            entity,
            now,
            dt,
            position: tf.translation.truncate(),
            velocity: &mut vel.0,
            grounded,
            frozen: freeze.is_some_and(Freeze::is_frozen),
            opponent: opponent
                .and_then(|o| o.target)
                .and_then(|t| q_positions.get(t).ok())
                .map(|t| t.translation.truncate()),
            actor: &mut *actor,
            latches: &mut *latches,
            driver: driver.as_deref_mut(),
            animator: animator.as_deref_mut(),
            selector: selector.as_deref_mut(),
            rng: rng.rng(),
            has_shooter,
            out: &mut out,
        };

        if thawed.contains(&entity) && ctx.actor.is_autonomous() {
            ctx.force_to_locomotion();
            machine.change_state(Transition::RestartMove, &mut ctx);
        }

        machine.update(&mut ctx);

        for skill_id in pending.remove(&entity).unwrap_or_default() {
            let gate = ctx.gate();
            let granted = ctx.selector.as_deref_mut().and_then(|s| s.request(&skill_id, &gate));
            match granted {
                Some(cast) => machine.change_state(Transition::Cast(CastingState::new(cast)), &mut ctx),
                None => debug!("{entity:?} skill `{skill_id}` rejected"),
            }
        }
    }

    for actor in pending.keys() {
        debug!("skill request for {actor:?}, which is not an actor");
    }
    flush(&mut out, &mut shots, &mut cues);
}

pub fn tick_fixed(
    time: Res<Time>,
    virt: Res<Time<Virtual>>,
    mut rng: ResMut<CombatRng>,
    mut q_actors: Query<ActorQuery>,
    q_positions: Query<&Transform>,
    mut shots: MessageWriter<FireRequest>,
    mut cues: MessageWriter<Cue>,
) {
    let now = clock::now(&virt);
    let dt = time.delta_secs();

    let mut out = Outbox::default();
    for (
        entity,
        mut machine,
        mut actor,
        mut latches,
        tf,
        mut vel,
        grounded,
        freeze,
        opponent,
        mut driver,
        mut animator,
        mut selector,
        has_shooter,
    ) in &mut q_actors
    {
        let mut ctx = ActorCtx {
            entity,
            now,
            dt,
            position: tf.translation.truncate(),
            velocity: &mut vel.0,
            grounded: grounded.is_some_and(|g| g.0),
            frozen: freeze.is_some_and(Freeze::is_frozen),
            opponent: opponent
                .and_then(|o| o.target)
                .and_then(|t| q_positions.get(t).ok())
                .map(|t| t.translation.truncate()),
            actor: &mut *actor,
            latches: &mut *latches,
            driver: driver.as_deref_mut(),
            animator: animator.as_deref_mut(),
            selector: selector.as_deref_mut(),
            rng: rng.rng(),
            has_shooter,
            out: &mut out,
        };
        machine.fixed_update(&mut ctx);
    }
    flush(&mut out, &mut shots, &mut cues);
}
