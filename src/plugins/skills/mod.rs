//! Skills plugin: skill configuration, per-actor cooldown arbitration and cast strategies.
//!
//! The casting lifecycle itself is a character state (`actors::states::casting`); this module
//! only decides *whether* a cast may start and *what* each phase does.

use bevy::prelude::*;

use crate::plugins::animation::{AnimationEventKind, Clip, ClipLibrary, names};

pub mod data;
pub mod runtime;
pub mod selector;
pub mod strategy;

use data::{SkillBook, SkillData};

const SKILL_CLIP_SECONDS: f32 = 0.9;
const SKILL_IMPACT_AT: f32 = 0.45;
const SKILL_END_AT: f32 = 0.8;
const CHARGE_AT: f32 = 0.05;

/// Ask `actor` to cast the skill it owns under `skill_id`.
#[derive(Message, Debug, Clone)]
pub struct SkillRequest {
    pub actor: Entity,
    pub skill_id: String,
}

impl SkillRequest {
    pub fn new(actor: Entity, skill_id: &str) -> Self {
        Self { actor, skill_id: skill_id.to_owned() }
    }
}

/// The scripted clip a skill's animation trigger plays.
pub fn skill_clip(data: &SkillData) -> Clip {
    let clip = Clip::new(names::SKILL_TAG, SKILL_CLIP_SECONDS)
        .with_event(SKILL_IMPACT_AT, AnimationEventKind::AttackImpact)
        .with_event(SKILL_END_AT, AnimationEventKind::SkillEnd);
    match data.multishot() {
        Ok(params) => clip.with_event(
            CHARGE_AT,
            AnimationEventKind::ChargeStart { seconds: params.charge_seconds.max(0.0) },
        ),
        Err(_) => clip,
    }
}

/// Needs the animation plugin's `ClipLibrary`.
fn register_skill_clips(book: Res<SkillBook>, mut library: ResMut<ClipLibrary>) {
    for skill in book.skills() {
        library.insert(&skill.animation_trigger, skill_clip(skill));
        debug!("skill `{}` clip on trigger `{}`", skill.id, skill.animation_trigger);
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<SkillBook>()
        .add_message::<SkillRequest>()
        .add_systems(Startup, register_skill_clips);
}
