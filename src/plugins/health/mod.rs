//! Health plugin: the damage sink every hit goes through.
//!
//! Callers never touch `Health` fields directly. They go through [`DamageSink::apply`], which
//! enforces the invulnerability window and reports change/death as messages.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::clock::{self, Deadline};

#[derive(Component, Debug, Clone)]
pub struct Health {
    max: f32,
    current: f32,
    invulnerability_seconds: f32,
    invulnerable: Deadline,
}

impl Health {
    pub fn new(max: f32, invulnerability_seconds: f32) -> Self {
        let max = max.max(1.0);
        Self {
            max,
            current: max,
            invulnerability_seconds: invulnerability_seconds.max(0.0),
            invulnerable: Deadline::NONE,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Apply non-negative damage at `now`. Returns the amount actually removed.
    pub fn apply(&mut self, damage: f32, now: f32) -> f32 {
        if self.is_dead() || damage <= 0.0 {
            return 0.0;
        }
        if self.invulnerable.is_armed() && !self.invulnerable.is_due(now) {
            return 0.0;
        }

        let before = self.current;
        self.current = (self.current - damage).max(0.0);
        if self.invulnerability_seconds > 0.0 {
            self.invulnerable = Deadline::after(now, self.invulnerability_seconds);
        }
        before - self.current
    }
}

#[derive(Message, Debug, Clone, Copy)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct Died {
    pub entity: Entity,
}

/// System-param wrapper around `Health` plus its notifications.
#[derive(SystemParam)]
pub struct DamageSink<'w, 's> {
    time: Res<'w, Time<Virtual>>,
    q_health: Query<'w, 's, &'static mut Health>,
    changed: MessageWriter<'w, HealthChanged>,
    died: MessageWriter<'w, Died>,
}

impl DamageSink<'_, '_> {
    #[inline]
    pub fn has_health(&self, target: Entity) -> bool {
        self.q_health.contains(target)
    }

    /// Returns the damage applied (0 if the target has no health, is dead or invulnerable).
    pub fn apply(&mut self, target: Entity, damage: f32) -> f32 {
        let now = clock::now(&self.time);
        let Ok(mut health) = self.q_health.get_mut(target) else {
            return 0.0;
        };
        let applied = health.apply(damage, now);
        if applied <= 0.0 {
            return 0.0;
        }

        self.changed.write(HealthChanged {
            entity: target,
            current: health.current(),
            max: health.max(),
        });
        if health.is_dead() {
            debug!("{target:?} died");
            self.died.write(Died { entity: target });
        }
        applied
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<HealthChanged>().add_message::<Died>();
}
