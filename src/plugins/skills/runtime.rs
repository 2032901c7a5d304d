use std::sync::Arc;

use super::data::SkillData;

/// Mutable per-actor state of one owned skill.
#[derive(Debug, Clone)]
pub struct SkillRuntime {
    pub data: Arc<SkillData>,
    pub cast_start_time: f32,
    next_ready_time: f32,
}

impl SkillRuntime {
    pub fn new(data: Arc<SkillData>) -> Self {
        Self { data, cast_start_time: 0.0, next_ready_time: 0.0 }
    }

    #[inline]
    pub fn next_ready_time(&self) -> f32 {
        self.next_ready_time
    }

    #[inline]
    pub fn is_ready(&self, now: f32) -> bool {
        now >= self.next_ready_time
    }

    #[inline]
    pub fn cooldown_remaining(&self, now: f32) -> f32 {
        (self.next_ready_time - now).max(0.0)
    }

    /// The one place the cooldown is written: cast completion, normal or interrupted.
    pub fn complete(&mut self, now: f32) {
        self.next_ready_time = now + self.data.cooldown_seconds.max(0.0);
    }
}
