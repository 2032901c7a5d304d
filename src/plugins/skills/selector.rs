//! Skill selection and cooldown arbitration for one actor.

use std::sync::Arc;

use bevy::prelude::*;

use super::data::{SkillBook, SkillData};
use super::runtime::SkillRuntime;
use super::strategy::{CastStrategy, SkillStrategy, UseGate};

/// A granted cast: everything the casting state needs, injected at construction.
#[derive(Debug, Clone)]
pub struct SkillCast {
    /// Position of the runtime inside its selector.
    pub index: usize,
    pub data: Arc<SkillData>,
    pub strategy: SkillStrategy,
}

#[derive(Component, Debug, Clone, Default)]
pub struct SkillSelector {
    runtimes: Vec<SkillRuntime>,
}

impl SkillSelector {
    pub fn new(skills: &[Arc<SkillData>]) -> Self {
        Self { runtimes: skills.iter().cloned().map(SkillRuntime::new).collect() }
    }

    pub fn from_book(book: &SkillBook) -> Self {
        Self::new(book.skills())
    }

    #[inline]
    pub fn runtimes(&self) -> &[SkillRuntime] {
        &self.runtimes
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.runtimes.iter().position(|r| r.data.id == id)
    }

    fn runtime(&self, id: &str) -> Option<&SkillRuntime> {
        self.runtimes.iter().find(|r| r.data.id == id)
    }

    /// Mutates only when every gate passes.
    fn try_begin(&mut self, index: usize, gate: &UseGate) -> Option<SkillCast> {
        if gate.casting {
            return None;
        }
        let runtime = self.runtimes.get_mut(index)?;
        if !runtime.is_ready(gate.now) {
            return None;
        }
        let strategy = SkillStrategy::for_kind(runtime.data.kind);
        if !strategy.is_usable(&runtime.data, gate) {
            return None;
        }
        runtime.cast_start_time = gate.now;
        Some(SkillCast { index, data: Arc::clone(&runtime.data), strategy })
    }

    /// Grants the named skill iff it is off cooldown, usable, and the actor is not casting.
    pub fn request(&mut self, id: &str, gate: &UseGate) -> Option<SkillCast> {
        let index = self.find(id)?;
        self.try_begin(index, gate)
    }

    /// First grantable skill in configured order.
    pub fn try_use_any_usable(&mut self, gate: &UseGate) -> Option<SkillCast> {
        if gate.casting {
            return None;
        }
        (0..self.runtimes.len()).find_map(|index| self.try_begin(index, gate))
    }

    /// Pay the cooldown of a finished cast.
    pub fn complete(&mut self, index: usize, now: f32) {
        if let Some(runtime) = self.runtimes.get_mut(index) {
            runtime.complete(now);
        }
    }

    pub fn is_ready(&self, id: &str, now: f32) -> bool {
        self.runtime(id).is_some_and(|r| r.is_ready(now))
    }

    pub fn cooldown_remaining(&self, id: &str, now: f32) -> f32 {
        self.runtime(id).map_or(0.0, |r| r.cooldown_remaining(now))
    }

    pub fn cooldown_seconds(&self, id: &str) -> f32 {
        self.runtime(id).map_or(0.0, |r| r.data.cooldown_seconds.max(0.0))
    }
}
