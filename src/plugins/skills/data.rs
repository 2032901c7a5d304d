//! Immutable skill configuration.
//!
//! A skill is a [`SkillData`] record with a [`SkillKind`] tag and kind-specific
//! [`SkillParams`]. Books of skills are plain JSON:
//!
//! ```json
//! { "skills": [
//!   { "id": "multi", "kind": "MultiShot", "cooldown_seconds": 4.0,
//!     "params": { "type": "MultiShot", "count": 3, "spread_degrees": 8.0 } }
//! ] }
//! ```

use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::common::tunables::ConfigError;
use crate::plugins::projectiles::components::PrototypeId;
use crate::plugins::projectiles::prototypes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SkillKind {
    MultiShot,
    JumpShot,
    TimeFreezeArrow,
    LightningArrow,
}

impl SkillKind {
    pub const fn expected_params(self) -> &'static str {
        match self {
            Self::MultiShot => "MultiShot",
            Self::JumpShot => "JumpShot",
            Self::TimeFreezeArrow | Self::LightningArrow => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "type")]
pub enum SkillParams {
    #[default]
    None,
    MultiShot {
        #[serde(default = "default_count")]
        count: u32,
        #[serde(default = "default_spread")]
        spread_degrees: f32,
        /// Length of the charge pre-delay authored into the cast clip.
        #[serde(default = "default_charge")]
        charge_seconds: f32,
    },
    JumpShot {
        #[serde(default = "default_initial_velocity_y")]
        initial_velocity_y: f32,
        #[serde(default = "default_jump_flight_time")]
        flight_time: f32,
    },
}

fn default_count() -> u32 {
    2
}
fn default_spread() -> f32 {
    6.0
}
fn default_charge() -> f32 {
    1.0
}
fn default_initial_velocity_y() -> f32 {
    8.0
}
fn default_jump_flight_time() -> f32 {
    0.35
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiShotParams {
    pub count: u32,
    pub spread_degrees: f32,
    pub charge_seconds: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpShotParams {
    pub initial_velocity_y: f32,
    pub flight_time: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum SkillDataError {
    #[error("skill `{id}` ({kind:?}) needs `{expected}` params")]
    InvalidSkillDataType { id: String, kind: SkillKind, expected: &'static str },
    #[error("skill `{id}`: {reason}")]
    Invalid { id: String, reason: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillData {
    pub id: String,
    pub kind: SkillKind,
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: f32,
    /// Fallback cast time. Carried for authoring tools; the cast itself ends on the skill-end
    /// animation event only.
    #[serde(default = "default_cast_time")]
    pub cast_time_seconds: f32,
    #[serde(default)]
    pub can_move_while_casting: bool,
    pub animation_trigger: String,
    #[serde(default = "default_damage")]
    pub damage: f32,
    #[serde(default = "default_minimum_range")]
    pub minimum_range: f32,
    #[serde(default)]
    pub projectile_override: Option<PrototypeId>,
    #[serde(default)]
    pub params: SkillParams,
}

fn default_cooldown() -> f32 {
    3.0
}
fn default_cast_time() -> f32 {
    0.1
}
fn default_damage() -> f32 {
    10.0
}
fn default_minimum_range() -> f32 {
    8.0
}

impl SkillData {
    pub fn new(id: &str, kind: SkillKind, animation_trigger: &str) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            cooldown_seconds: default_cooldown(),
            cast_time_seconds: default_cast_time(),
            can_move_while_casting: false,
            animation_trigger: animation_trigger.to_owned(),
            damage: default_damage(),
            minimum_range: default_minimum_range(),
            projectile_override: None,
            params: SkillParams::None,
        }
    }

    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    pub fn with_params(mut self, params: SkillParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_override(mut self, prototype: &str) -> Self {
        self.projectile_override = Some(PrototypeId::new(prototype));
        self
    }

    pub fn moving_while_casting(mut self) -> Self {
        self.can_move_while_casting = true;
        self
    }

    fn wrong_type(&self) -> SkillDataError {
        SkillDataError::InvalidSkillDataType {
            id: self.id.clone(),
            kind: self.kind,
            expected: self.kind.expected_params(),
        }
    }

    pub fn multishot(&self) -> Result<MultiShotParams, SkillDataError> {
        match self.params {
            SkillParams::MultiShot { count, spread_degrees, charge_seconds } => {
                Ok(MultiShotParams { count, spread_degrees, charge_seconds })
            }
            _ => Err(self.wrong_type()),
        }
    }

    pub fn jump_shot(&self) -> Result<JumpShotParams, SkillDataError> {
        match self.params {
            SkillParams::JumpShot { initial_velocity_y, flight_time } => {
                Ok(JumpShotParams { initial_velocity_y, flight_time })
            }
            _ => Err(self.wrong_type()),
        }
    }

    /// Field sanity. A params/kind mismatch is not an error here: the strategy reports it
    /// when the phase that needs the params runs.
    pub fn validate(&self) -> Result<(), SkillDataError> {
        let invalid = |reason| SkillDataError::Invalid { id: self.id.clone(), reason };
        if self.id.is_empty() {
            return Err(invalid("id is empty"));
        }
        if self.animation_trigger.is_empty() {
            return Err(invalid("animation trigger is empty"));
        }
        if !non_negative(self.cooldown_seconds) {
            return Err(invalid("cooldown must be non-negative"));
        }
        if !non_negative(self.damage) {
            return Err(invalid("damage must be non-negative"));
        }
        if !non_negative(self.minimum_range) {
            return Err(invalid("minimum range must be non-negative"));
        }
        Ok(())
    }
}

#[inline]
fn non_negative(x: f32) -> bool {
    x >= 0.0
}

#[derive(Debug, Error)]
pub enum SkillBookError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Skill(#[from] SkillDataError),
    #[error("duplicate skill id `{0}`")]
    DuplicateId(String),
}

#[derive(Deserialize)]
struct SkillBookFile {
    skills: Vec<SkillData>,
}

/// The ordered skills every combatant is handed at spawn.
#[derive(Resource, Debug, Clone)]
pub struct SkillBook {
    skills: Vec<Arc<SkillData>>,
}

impl Default for SkillBook {
    fn default() -> Self {
        let skills = vec![
            SkillData::new("multi_shot", SkillKind::MultiShot, "MultiShot")
                .with_cooldown(4.0)
                .with_params(SkillParams::MultiShot {
                    count: 3,
                    spread_degrees: default_spread(),
                    charge_seconds: default_charge(),
                }),
            SkillData::new("jump_shot", SkillKind::JumpShot, "JumpShot")
                .with_cooldown(5.0)
                .with_params(SkillParams::JumpShot {
                    initial_velocity_y: default_initial_velocity_y(),
                    flight_time: default_jump_flight_time(),
                }),
            SkillData::new("time_freeze_arrow", SkillKind::TimeFreezeArrow, "FreezeArrow")
                .with_cooldown(8.0)
                .with_override(prototypes::FREEZE_ARROW),
            SkillData::new("lightning_arrow", SkillKind::LightningArrow, "LightningArrow")
                .with_cooldown(10.0)
                .with_override(prototypes::LIGHTNING_ARROW),
        ];
        Self { skills: skills.into_iter().map(Arc::new).collect() }
    }
}

impl SkillBook {
    pub fn new(skills: Vec<SkillData>) -> Result<Self, SkillBookError> {
        let mut seen = Vec::with_capacity(skills.len());
        for skill in &skills {
            skill.validate()?;
            if seen.contains(&skill.id.as_str()) {
                return Err(SkillBookError::DuplicateId(skill.id.clone()));
            }
            seen.push(skill.id.as_str());
        }
        Ok(Self { skills: skills.into_iter().map(Arc::new).collect() })
    }

    pub fn from_json(json: &str) -> Result<Self, SkillBookError> {
        let file: SkillBookFile = serde_json::from_str(json).map_err(ConfigError::from)?;
        Self::new(file.skills)
    }

    #[inline]
    pub fn skills(&self) -> &[Arc<SkillData>] {
        &self.skills
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SkillData>> {
        self.skills.iter().find(|s| s.id == id)
    }
}
