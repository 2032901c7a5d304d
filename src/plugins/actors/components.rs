//! Actor-side data shared by every state.

use bevy::prelude::*;

use crate::common::{team::Team, tunables::BotTunables};
use crate::plugins::skills::data::SkillKind;

#[derive(Debug, Clone)]
pub enum Control {
    Human,
    Autonomous(BotTunables),
}

/// Airborne horizontal lock engaged by jump-type skills.
///
/// Horizontal input is suppressed only while airborne. Released on the first grounded physics
/// tick after the actor has actually left the ground, or when the cast ends without a liftoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveLock {
    engaged: bool,
    left_ground: bool,
}

impl MoveLock {
    #[inline]
    pub fn engage(&mut self) {
        self.engaged = true;
        self.left_ground = false;
    }

    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Input must be forced to 0 this tick.
    #[inline]
    pub fn suppresses_input(&self, grounded: bool) -> bool {
        self.engaged && !grounded
    }

    /// Drop a lock whose actor never left the ground. Returns true on release.
    pub fn release_if_never_airborne(&mut self) -> bool {
        if self.engaged && !self.left_ground {
            *self = Self::default();
            return true;
        }
        false
    }

    /// Feed one physics tick's grounded reading. Returns true on release.
    pub fn observe(&mut self, grounded: bool) -> bool {
        if !self.engaged {
            return false;
        }
        if !grounded {
            self.left_ground = true;
            return false;
        }
        if self.left_ground {
            *self = Self::default();
            return true;
        }
        false
    }
}

#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub control: Control,
    /// Set exactly while the current state is casting.
    pub casting: Option<SkillKind>,
    pub move_lock: MoveLock,
    pub stop_threshold: f32,
}

impl Actor {
    pub fn human(stop_threshold: f32) -> Self {
        Self {
            control: Control::Human,
            casting: None,
            move_lock: MoveLock::default(),
            stop_threshold,
        }
    }

    pub fn autonomous(tuning: BotTunables, stop_threshold: f32) -> Self {
        Self {
            control: Control::Autonomous(tuning),
            ..Self::human(stop_threshold)
        }
    }

    #[inline]
    pub fn is_casting(&self) -> bool {
        self.casting.is_some()
    }

    #[inline]
    pub fn is_autonomous(&self) -> bool {
        matches!(self.control, Control::Autonomous(_))
    }

    #[inline]
    pub fn bot_tuning(&self) -> Option<&BotTunables> {
        match &self.control {
            Control::Autonomous(t) => Some(t),
            Control::Human => None,
        }
    }
}

/// Single-bit flags set by animation events, cleared exactly once when consumed.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AnimationLatches {
    impact: bool,
    skill_end: bool,
}

impl AnimationLatches {
    #[inline]
    pub fn set_impact(&mut self) {
        self.impact = true;
    }

    #[inline]
    pub fn set_skill_end(&mut self) {
        self.skill_end = true;
    }

    #[inline]
    pub fn consume_impact(&mut self) -> bool {
        std::mem::take(&mut self.impact)
    }

    #[inline]
    pub fn consume_skill_end(&mut self) -> bool {
        std::mem::take(&mut self.skill_end)
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Who this actor fights. `target` stays `None` until [`resolve_opponents`] finds a live
/// entity of the wanted team; nothing searches again once it is set.
///
/// [`resolve_opponents`]: super::resolve_opponents
#[derive(Component, Debug, Clone, Copy)]
pub struct Opponent {
    pub seek: Team,
    pub target: Option<Entity>,
}

impl Opponent {
    pub fn seeking(team: Team) -> Self {
        Self { seek: team, target: None }
    }
}
