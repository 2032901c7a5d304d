//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    /// Terrain: floor, walls, ice pillars.
    Ground,
    Player,
    Bot,
    Projectile,
}

impl Layer {
    /// Layers a combatant body lives on, keyed by team.
    pub fn for_team(team: crate::common::team::Team) -> Self {
        match team {
            crate::common::team::Team::Player => Layer::Player,
            crate::common::team::Team::Bot => Layer::Bot,
        }
    }
}
