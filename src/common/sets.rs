//! Cross-plugin system ordering.
//!
//! ```text
//! Update:          Input -> Animation -> Logic -> Shoot -> Effects
//! FixedUpdate:     Sense -> Act -> Drive
//! FixedPostUpdate: (CollisionEventSystems) -> Resolve -> Effects
//! ```

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Human input and skill requests.
    Input,
    /// Animation playback and latching of its events.
    Animation,
    /// Freeze countdown and the state machine logic tick.
    Logic,
    /// Fire requests become pooled projectiles.
    Shoot,
    /// Projectile observers and timed effects.
    Effects,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Grounded probes.
    Sense,
    /// State machine movement tick.
    Act,
    /// Movement driver writes velocity.
    Drive,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostTickSet {
    /// Projectile sweep, collision resolve, expiry, return commit.
    Resolve,
    /// Hit and stick observers.
    Effects,
}
