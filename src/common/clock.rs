//! Game-clock deadlines.
//!
//! Every suspension point in the combat core (cooldowns, freeze countdown, projectile return,
//! idle exit, strike interval, pillar growth) is a `Deadline` polled once per tick against
//! `Time<Virtual>` elapsed seconds. Re-arming always replaces or extends the single slot; there
//! is no second concurrent timer for the same purpose.

use bevy::prelude::*;

/// Current gameplay time in seconds.
#[inline]
pub fn now(time: &Time<Virtual>) -> f32 {
    time.elapsed_secs()
}

/// A "resume at time X" slot. `None` means no pending deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Deadline(Option<f32>);

impl Deadline {
    pub const NONE: Self = Self(None);

    #[inline]
    pub fn at(t: f32) -> Self {
        Self(Some(t))
    }

    #[inline]
    pub fn after(now: f32, seconds: f32) -> Self {
        Self(Some(now + seconds.max(0.0)))
    }

    #[inline]
    pub fn get(self) -> Option<f32> {
        self.0
    }

    #[inline]
    pub fn is_armed(self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn is_due(self, now: f32) -> bool {
        self.0.is_some_and(|t| now >= t)
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.0 = None;
    }

    /// Replace whatever was pending.
    #[inline]
    pub fn replace(&mut self, t: f32) {
        self.0 = Some(t);
    }

    /// Keep the later of the pending deadline and `t`.
    #[inline]
    pub fn extend_to(&mut self, t: f32) {
        self.0 = Some(self.0.map_or(t, |cur| cur.max(t)));
    }

    #[inline]
    pub fn remaining(self, now: f32) -> f32 {
        self.0.map_or(0.0, |t| (t - now).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::Deadline;

    #[test]
    fn extend_keeps_the_later_deadline() {
        let mut d = Deadline::after(0.0, 1.0);
        d.extend_to(0.5);
        assert_eq!(d.get(), Some(1.0));
        d.extend_to(2.0);
        assert_eq!(d.get(), Some(2.0));
    }

    #[test]
    fn cancelled_deadline_is_never_due() {
        let mut d = Deadline::at(1.0);
        assert!(d.is_due(1.0));
        d.cancel();
        assert!(!d.is_due(100.0));
        assert_eq!(d.remaining(0.0), 0.0);
    }
}
