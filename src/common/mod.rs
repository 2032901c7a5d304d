//! Common, shared types.

pub mod clock;
pub mod layers;
pub mod rng;
pub mod sets;
pub mod state;
pub mod team;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
