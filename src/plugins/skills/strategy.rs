//! Per-kind cast behaviour.
//!
//! Each kind implements the same four-phase contract. The casting state owns a
//! [`SkillStrategy`] picked from the skill's [`SkillKind`] and drives it; strategies never
//! touch the state machine themselves.

use bevy::prelude::*;

use super::data::{SkillData, SkillKind};
use crate::plugins::actors::context::{ActorCtx, ShotSpec};
use crate::plugins::cues::CueKind;

/// MultiShot anchors never point flatter than this.
const MIN_ANCHOR_RISE: f32 = 0.25;
/// Two shots with no spread would overlap exactly.
const TWIN_SHOT_MIN_SPREAD_DEG: f32 = 5.0;
const JUMP_SHOT_MIN_FLIGHT_TIME: f32 = 0.05;
const FORWARD_FALLBACK_MIN: f32 = 1.0;

/// What a usability predicate may look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UseGate {
    pub now: f32,
    pub grounded: bool,
    pub frozen: bool,
    pub casting: bool,
}

pub trait CastStrategy {
    /// Strategy-specific usability on top of the cooldown and not-casting gates.
    fn is_usable(&self, _data: &SkillData, _gate: &UseGate) -> bool {
        true
    }

    fn begin_cast(&self, data: &SkillData, ctx: &mut ActorCtx);

    /// Runs at most once per cast, on the impact animation event.
    fn on_impact(&self, data: &SkillData, ctx: &mut ActorCtx);

    fn end_cast(&self, _data: &SkillData, _ctx: &mut ActorCtx) {}
}

fn shot(data: &SkillData) -> ShotSpec {
    ShotSpec {
        prototype: data.projectile_override.clone(),
        flight_time: None,
        damage: Some(data.damage),
    }
}

/// Opponent position, or a point straight ahead at `max(1, minimum range)`.
fn target_or_forward(data: &SkillData, ctx: &ActorCtx) -> Vec2 {
    ctx.opponent
        .unwrap_or_else(|| ctx.forward_point(data.minimum_range.max(FORWARD_FALLBACK_MIN)))
}

// -----------------------------------------------------------------------------
// MultiShot
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultiShot;

impl MultiShot {
    /// Angular offsets in degrees for `count` shots fanned over `spread`.
    pub fn offsets(count: u32, spread_degrees: f32) -> Vec<f32> {
        let mut spread = spread_degrees.max(0.0);
        if count <= 2 {
            if spread < 0.01 {
                spread = TWIN_SHOT_MIN_SPREAD_DEG;
            }
            vec![-spread * 0.5, spread * 0.5]
        } else {
            vec![-spread, 0.0, spread]
        }
    }

    /// Anchor direction and aim distance for the fan.
    pub fn anchor(data: &SkillData, ctx: &ActorCtx) -> (Vec2, f32) {
        let forward = ctx.forward_direction();
        let (direction, anchor) = match ctx.opponent {
            Some(target) => {
                let mut raw = target - ctx.position;
                raw.y = raw.y.max(MIN_ANCHOR_RISE);
                (raw.normalize_or(forward), target)
            }
            None => (forward, ctx.position + forward * data.minimum_range),
        };
        let distance = ctx.position.distance(anchor);
        (direction, data.minimum_range.max(distance))
    }
}

impl CastStrategy for MultiShot {
    fn begin_cast(&self, _data: &SkillData, _ctx: &mut ActorCtx) {}

    fn on_impact(&self, data: &SkillData, ctx: &mut ActorCtx) {
        let params = match data.multishot() {
            Ok(params) => params,
            Err(err) => {
                warn!("{err}, impact skipped");
                return;
            }
        };

        let (direction, distance) = Self::anchor(data, ctx);
        for offset in Self::offsets(params.count, params.spread_degrees) {
            let heading = Vec2::from_angle(offset.to_radians()).rotate(direction);
            let aim = ctx.position + heading * distance;
            ctx.fire_at(aim, shot(data));
        }
    }
}

// -----------------------------------------------------------------------------
// JumpShot
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpShot;

impl CastStrategy for JumpShot {
    fn is_usable(&self, _data: &SkillData, gate: &UseGate) -> bool {
        !gate.frozen && gate.grounded
    }

    fn begin_cast(&self, data: &SkillData, ctx: &mut ActorCtx) {
        ctx.cue(CueKind::Jump);
        ctx.actor.move_lock.engage();

        match data.jump_shot() {
            Ok(params) => {
                ctx.velocity.y = ctx.velocity.y.max(params.initial_velocity_y);
            }
            Err(err) => warn!("{err}, jump skipped"),
        }
    }

    fn on_impact(&self, data: &SkillData, ctx: &mut ActorCtx) {
        let params = match data.jump_shot() {
            Ok(params) => params,
            Err(err) => {
                warn!("{err}, impact skipped");
                return;
            }
        };
        let target = target_or_forward(data, ctx);
        let spec = ShotSpec {
            flight_time: Some(params.flight_time.max(JUMP_SHOT_MIN_FLIGHT_TIME)),
            ..shot(data)
        };
        ctx.fire_at(target, spec);
    }

    fn end_cast(&self, _data: &SkillData, ctx: &mut ActorCtx) {
        if ctx.actor.move_lock.release_if_never_airborne() {
            debug!("{:?}: jump never left the ground, move lock released", ctx.entity);
        }
    }
}

// -----------------------------------------------------------------------------
// TimeFreezeArrow / LightningArrow
// -----------------------------------------------------------------------------

/// A single special arrow. The combat effect rides on the projectile prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrowShot;

impl CastStrategy for ArrowShot {
    fn begin_cast(&self, _data: &SkillData, _ctx: &mut ActorCtx) {}

    fn on_impact(&self, data: &SkillData, ctx: &mut ActorCtx) {
        if data.projectile_override.is_none() {
            warn!("skill `{}` has no projectile override, firing the default arrow", data.id);
        }
        let target = target_or_forward(data, ctx);
        ctx.fire_at(target, shot(data));
    }
}

// -----------------------------------------------------------------------------
// Dispatch
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillStrategy {
    MultiShot(MultiShot),
    JumpShot(JumpShot),
    Arrow(ArrowShot),
}

impl SkillStrategy {
    pub fn for_kind(kind: SkillKind) -> Self {
        match kind {
            SkillKind::MultiShot => Self::MultiShot(MultiShot),
            SkillKind::JumpShot => Self::JumpShot(JumpShot),
            SkillKind::TimeFreezeArrow | SkillKind::LightningArrow => Self::Arrow(ArrowShot),
        }
    }

    fn inner(&self) -> &dyn CastStrategy {
        match self {
            Self::MultiShot(s) => s,
            Self::JumpShot(s) => s,
            Self::Arrow(s) => s,
        }
    }
}

impl CastStrategy for SkillStrategy {
    fn is_usable(&self, data: &SkillData, gate: &UseGate) -> bool {
        self.inner().is_usable(data, gate)
    }

    fn begin_cast(&self, data: &SkillData, ctx: &mut ActorCtx) {
        self.inner().begin_cast(data, ctx);
    }

    fn on_impact(&self, data: &SkillData, ctx: &mut ActorCtx) {
        self.inner().on_impact(data, ctx);
    }

    fn end_cast(&self, data: &SkillData, ctx: &mut ActorCtx) {
        self.inner().end_cast(data, ctx);
    }
}
