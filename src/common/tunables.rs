//! Tunable gameplay constants.
//!
//! Every section defaults to the values the combat core ships with, and every field is
//! `#[serde(default)]`, so a JSON override only needs to name what it changes.

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub world: WorldTunables,
    pub projectiles: ProjectileTunables,
    pub mover: MoverTunables,
    pub bot: BotTunables,
    pub combatant: CombatantTunables,
    /// Seed for `CombatRng`. Unset draws from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            world: WorldTunables::default(),
            projectiles: ProjectileTunables::default(),
            mover: MoverTunables::default(),
            bot: BotTunables::default(),
            combatant: CombatantTunables::default(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldTunables {
    /// Downward gravity magnitude, m/s^2.
    pub gravity: f32,
    pub length_unit: f32,
    pub arena_half_width: f32,
    pub floor_y: f32,
}

impl Default for WorldTunables {
    fn default() -> Self {
        Self { gravity: 9.81, length_unit: 1.0, arena_half_width: 12.0, floor_y: -3.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileTunables {
    pub pool_initial_size: usize,
    pub default_flight_time: f32,
    pub default_damage: f32,
    pub lifetime: f32,
    pub stick_lifetime: f32,
    /// Non-positive keeps the prototype's own gravity scale.
    pub gravity_scale_override: f32,
    pub orient_to_velocity: bool,
    pub orient_min_speed: f32,
    pub orient_lerp_speed: f32,
    pub heading_offset_deg: f32,
    pub segment_sweep: bool,
    pub sweep_skin: f32,
    /// Muzzle offset from the shooter origin, in facing space (x flips with facing).
    pub fire_offset: [f32; 2],
}

impl Default for ProjectileTunables {
    fn default() -> Self {
        Self {
            pool_initial_size: 12,
            default_flight_time: 0.8,
            default_damage: 10.0,
            lifetime: 2.5,
            stick_lifetime: 1.0,
            gravity_scale_override: 0.0,
            orient_to_velocity: true,
            orient_min_speed: 0.05,
            orient_lerp_speed: 12.0,
            heading_offset_deg: 0.0,
            segment_sweep: true,
            sweep_skin: 0.02,
            fire_offset: [0.45, 0.35],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoverTunables {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
}

impl Default for MoverTunables {
    fn default() -> Self {
        Self { max_speed: 6.0, acceleration: 22.0, deceleration: 26.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotTunables {
    pub move_distance_min: f32,
    pub move_distance_max: f32,
    pub idle_seconds_min: f32,
    pub idle_seconds_max: f32,
    pub input_magnitude: f32,
    pub min_progress_epsilon: f32,
    pub boundary_hold_seconds: f32,
    pub stuck_speed_threshold: f32,
    pub stuck_flip_seconds: f32,
    /// Reverse direction after `stuck_flip_seconds` below `stuck_speed_threshold`.
    pub auto_flip_on_rail_edge: bool,
    pub auto_cast_interval: f32,
}

impl Default for BotTunables {
    fn default() -> Self {
        Self {
            move_distance_min: 1.5,
            move_distance_max: 4.0,
            idle_seconds_min: 0.8,
            idle_seconds_max: 2.0,
            input_magnitude: 1.0,
            min_progress_epsilon: 0.005,
            boundary_hold_seconds: 0.12,
            stuck_speed_threshold: 0.02,
            stuck_flip_seconds: 0.20,
            auto_flip_on_rail_edge: true,
            auto_cast_interval: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CombatantTunables {
    pub max_hp: f32,
    pub invulnerability_seconds: f32,
    pub stop_threshold: f32,
    pub half_size: [f32; 2],
    pub spawn_x: f32,
}

impl Default for CombatantTunables {
    fn default() -> Self {
        Self {
            max_hp: 500.0,
            invulnerability_seconds: 0.15,
            stop_threshold: 0.05,
            half_size: [0.4, 0.9],
            spawn_x: 6.0,
        }
    }
}

impl Tunables {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        let tunables: Self = serde_json::from_str(src)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projectiles.pool_initial_size == 0 {
            return Err(ConfigError::Invalid {
                field: "projectiles.pool_initial_size",
                reason: "must be at least 1",
            });
        }
        if self.projectiles.default_flight_time < 0.1 {
            return Err(ConfigError::Invalid {
                field: "projectiles.default_flight_time",
                reason: "must be at least 0.1 seconds",
            });
        }
        if self.bot.move_distance_min > self.bot.move_distance_max {
            return Err(ConfigError::Invalid {
                field: "bot.move_distance_min",
                reason: "must not exceed bot.move_distance_max",
            });
        }
        if self.bot.idle_seconds_min > self.bot.idle_seconds_max {
            return Err(ConfigError::Invalid {
                field: "bot.idle_seconds_min",
                reason: "must not exceed bot.idle_seconds_max",
            });
        }
        Ok(())
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        Vec2::from_array(self.combatant.half_size)
    }
}
