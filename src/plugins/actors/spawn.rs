//! Shared combatant bundle. Player and bot differ only in control, team and colour.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::components::{Actor, AnimationLatches, Opponent};
use super::freeze::Freeze;
use super::fsm::StateMachine;
use crate::common::{layers::Layer, state::GameState, team::Team, tunables::Tunables};
use crate::plugins::animation::{Animator, ClipPlayer};
use crate::plugins::health::Health;
use crate::plugins::mover::MoveDriver;
use crate::plugins::physics::{GroundProbe, Grounded};
use crate::plugins::projectiles::shooter::Shooter;
use crate::plugins::skills::data::SkillBook;
use crate::plugins::skills::selector::SkillSelector;

pub struct CombatantSpec {
    pub name: &'static str,
    pub team: Team,
    pub autonomous: bool,
    /// Spawn side: -1 left, +1 right. The combatant faces the centre.
    pub side: f32,
    pub color: Color,
}

pub fn combatant_bundle(spec: &CombatantSpec, tunables: &Tunables, book: &SkillBook) -> impl Bundle {
    let half = tunables.half_size();
    let stop = tunables.combatant.stop_threshold;
    let actor = if spec.autonomous {
        Actor::autonomous(tunables.bot.clone(), stop)
    } else {
        Actor::human(stop)
    };
    let origin = Vec2::new(
        spec.side * tunables.combatant.spawn_x,
        tunables.world.floor_y + half.y,
    );
    let layers = CollisionLayers::new(
        Layer::for_team(spec.team),
        [Layer::Ground, Layer::Projectile],
    );

    (
        (
            Name::new(spec.name),
            spec.team,
            actor,
            Opponent::seeking(spec.team.opposing()),
            StateMachine::default(),
            AnimationLatches::default(),
            Freeze::default(),
            Health::new(tunables.combatant.max_hp, tunables.combatant.invulnerability_seconds),
            Shooter::from_tunables(&tunables.projectiles, Layer::for_team(spec.team.opposing())),
            MoveDriver::new(&tunables.mover, -spec.side),
            Animator::default(),
            ClipPlayer::default(),
            SkillSelector::from_book(book),
        ),
        (
            Grounded::default(),
            GroundProbe::for_half_height(half.y),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::rectangle(half.x * 2.0, half.y * 2.0),
            layers,
            Sprite {
                color: spec.color,
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(origin.extend(1.0)),
            DespawnOnExit(GameState::InGame),
        ),
    )
}
