//! Effects plugin: projectile observers (freeze, lightning) and their timed leftovers.
//!
//! Observers read `ProjectileHit` / `ProjectileStuck` after the resolve pass. They never touch
//! the projectile itself; anything that must outlive the arrow is spawned as its own entity.

pub mod freeze;
pub mod lightning;

use bevy::prelude::*;

use crate::common::sets::{FrameSet, PostTickSet};

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        (
            freeze::freeze_on_hit,
            freeze::spawn_ice_pillars,
            lightning::start_lightning,
            lightning::snap_sequences_to_ground,
            lightning::run_lightning_sequences,
            lightning::apply_strikes,
        )
            .chain()
            .in_set(PostTickSet::Effects),
    )
    .add_systems(Update, freeze::grow_ice_pillars.in_set(FrameSet::Effects));
}

#[cfg(test)]
mod tests;
