//! Animation plugin: the animation source collaborator plus a scripted clip driver.
//!
//! The combat core talks to [`Animator`] only: named triggers with reset-then-set semantics, a
//! current state-tag query, a forced cross-fade back to locomotion, bool parameters, and a
//! playback-speed scalar. It never schedules events itself.
//!
//! [`ClipPlayer`] stands in for authored animation clips: when a trigger is set it plays the
//! matching [`Clip`] and writes [`AnimationEvent`]s at the authored clip times, scaled by the
//! animator's effective speed (so freeze and charge pauses stretch the clip).

use bevy::prelude::*;
use bevy::platform::collections::HashMap;

use crate::common::clock::{self, Deadline};
use crate::common::sets::FrameSet;

pub mod names {
    pub const ATTACK_TRIGGER: &str = "Fire";
    pub const ATTACK_TAG: &str = "Attack";
    pub const SKILL_TAG: &str = "Skill";
    pub const LOCOMOTION: &str = "Locomotion";
    pub const IS_GROUNDED: &str = "IsGrounded";
}

// -----------------------------------------------------------------------------
// Animation source
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct Animator {
    triggers: Vec<String>,
    state_tag: Option<String>,
    crossfade: Option<String>,
    bools: HashMap<String, bool>,
    speed: f32,
    paused_until: Deadline,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            triggers: Vec::new(),
            state_tag: None,
            crossfade: None,
            bools: HashMap::default(),
            speed: 1.0,
            paused_until: Deadline::NONE,
        }
    }
}

impl Animator {
    pub fn set_trigger(&mut self, name: &str) {
        if !self.has_trigger(name) {
            self.triggers.push(name.to_owned());
        }
    }

    pub fn reset_trigger(&mut self, name: &str) {
        self.triggers.retain(|t| t != name);
    }

    #[inline]
    pub fn has_trigger(&self, name: &str) -> bool {
        self.triggers.iter().any(|t| t == name)
    }

    #[inline]
    pub fn is_in_tag(&self, tag: &str) -> bool {
        self.state_tag.as_deref() == Some(tag)
    }

    #[inline]
    pub fn state_tag(&self) -> Option<&str> {
        self.state_tag.as_deref()
    }

    /// Jump straight to `state`, abandoning whatever clip is playing.
    pub fn crossfade(&mut self, state: &str) {
        self.crossfade = Some(state.to_owned());
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_owned(), value);
    }

    #[inline]
    pub fn get_bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Hold playback for `seconds` of game time.
    pub fn pause_for(&mut self, now: f32, seconds: f32) {
        self.paused_until.extend_to(now + seconds.max(0.0));
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_until.is_armed()
    }

    #[inline]
    pub fn effective_speed(&self) -> f32 {
        if self.is_paused() { 0.0 } else { self.speed }
    }

    fn tick_pause(&mut self, now: f32) {
        if self.paused_until.is_due(now) {
            self.paused_until.cancel();
        }
    }
}

// -----------------------------------------------------------------------------
// Events written at authored clip times
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEventKind {
    AttackImpact,
    SkillEnd,
    ChargeStart { seconds: f32 },
}

#[derive(Message, Debug, Clone, Copy)]
pub struct AnimationEvent {
    pub actor: Entity,
    pub kind: AnimationEventKind,
}

// -----------------------------------------------------------------------------
// Scripted clips
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Clip {
    pub tag: &'static str,
    pub duration: f32,
    /// `(clip time, event)`, sorted by time.
    pub events: Vec<(f32, AnimationEventKind)>,
}

impl Clip {
    pub fn new(tag: &'static str, duration: f32) -> Self {
        Self { tag, duration, events: Vec::new() }
    }

    pub fn with_event(mut self, at: f32, kind: AnimationEventKind) -> Self {
        self.events.push((at, kind));
        self.events.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }
}

/// Trigger name -> clip.
#[derive(Resource, Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: HashMap<String, Clip>,
}

impl ClipLibrary {
    pub fn insert(&mut self, trigger: &str, clip: Clip) {
        self.clips.insert(trigger.to_owned(), clip);
    }

    #[inline]
    pub fn get(&self, trigger: &str) -> Option<&Clip> {
        self.clips.get(trigger)
    }

    /// The basic attack loop every combatant shares.
    pub fn with_basic_attack() -> Self {
        let mut lib = Self::default();
        lib.insert(
            names::ATTACK_TRIGGER,
            Clip::new(names::ATTACK_TAG, 0.6).with_event(0.35, AnimationEventKind::AttackImpact),
        );
        lib
    }
}

#[derive(Debug, Clone)]
struct Playing {
    trigger: String,
    elapsed: f32,
    next_event: usize,
}

#[derive(Component, Debug, Clone, Default)]
pub struct ClipPlayer {
    playing: Option<Playing>,
}

impl ClipPlayer {
    #[inline]
    pub fn playing(&self) -> Option<&str> {
        self.playing.as_ref().map(|p| p.trigger.as_str())
    }
}

/// Pick the trigger to start this frame: skill triggers preempt anything, the attack trigger
/// waits for the current clip to finish.
fn next_trigger(animator: &Animator, player: &ClipPlayer, library: &ClipLibrary) -> Option<String> {
    let skill = animator
        .triggers
        .iter()
        .find(|t| t.as_str() != names::ATTACK_TRIGGER && library.get(t).is_some());
    if let Some(t) = skill {
        return Some(t.clone());
    }
    if player.playing.is_none() && animator.has_trigger(names::ATTACK_TRIGGER) {
        return Some(names::ATTACK_TRIGGER.to_owned());
    }
    None
}

pub fn play_clips(
    time: Res<Time>,
    virt: Res<Time<Virtual>>,
    library: Res<ClipLibrary>,
    mut q: Query<(Entity, &mut Animator, &mut ClipPlayer)>,
    mut events: MessageWriter<AnimationEvent>,
) {
    let now = clock::now(&virt);
    let dt = time.delta_secs();

    for (actor, mut animator, mut player) in &mut q {
        animator.tick_pause(now);

        if let Some(state) = animator.crossfade.take() {
            player.playing = None;
            animator.state_tag = (state != names::LOCOMOTION).then_some(state);
        }

        if let Some(trigger) = next_trigger(&animator, &player, &library) {
            animator.reset_trigger(&trigger);
            if let Some(clip) = library.get(&trigger) {
                animator.state_tag = Some(clip.tag.to_owned());
            }
            player.playing = Some(Playing { trigger, elapsed: 0.0, next_event: 0 });
        }

        let speed = animator.effective_speed();
        let Some(playing) = player.playing.as_mut() else {
            continue;
        };
        let Some(clip) = library.get(&playing.trigger) else {
            player.playing = None;
            animator.state_tag = None;
            continue;
        };

        playing.elapsed += dt * speed;
        while let Some(&(at, kind)) = clip.events.get(playing.next_event) {
            if playing.elapsed < at {
                break;
            }
            playing.next_event += 1;
            events.write(AnimationEvent { actor, kind });
        }

        if playing.elapsed >= clip.duration {
            player.playing = None;
            animator.state_tag = None;
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<AnimationEvent>()
        .insert_resource(ClipLibrary::with_basic_attack())
        .add_systems(Update, play_clips.in_set(FrameSet::Animation));
}

#[cfg(test)]
mod tests;
