//! Team tags used for owner exclusion and opponent lookup.

use bevy::prelude::*;
use serde::Deserialize;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Team {
    Player,
    Bot,
}

impl Team {
    #[inline]
    pub fn opposing(self) -> Self {
        match self {
            Team::Player => Team::Bot,
            Team::Bot => Team::Player,
        }
    }
}
