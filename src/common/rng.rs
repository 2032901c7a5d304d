//! Shared random source for autonomous behaviour.
//!
//! One `ChaCha8Rng` for the whole combat core. Seeding it from `Tunables::rng_seed` makes a
//! match replayable on the same machine; without a seed it draws from OS entropy.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Resource)]
pub struct CombatRng {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl CombatRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            seed: None,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
