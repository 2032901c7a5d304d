//! Player plugin: the human-controlled combatant.
//!
//! Pipeline:
//! - OnEnter(InGame): spawn the combatant on the left
//! - Update (Input): A/D write the movement driver input, 1-4 request skills in book order
//!
//! Input is optional so headless apps without `InputPlugin` still run every other system.

use bevy::prelude::*;

use crate::common::{sets::FrameSet, state::GameState, team::Team, tunables::Tunables};
use crate::plugins::actors::spawn::{CombatantSpec, combatant_bundle};
use crate::plugins::mover::MoveDriver;
use crate::plugins::skills::SkillRequest;
use crate::plugins::skills::data::SkillBook;

#[derive(Component)]
pub struct Player;

const SKILL_KEYS: [KeyCode; 4] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, (gather_move_input, gather_skill_input).in_set(FrameSet::Input));
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>, book: Res<SkillBook>) {
    let spec = CombatantSpec {
        name: "Player",
        team: Team::Player,
        autonomous: false,
        side: -1.0,
        color: Color::srgb(0.2, 0.75, 0.9),
    };
    commands.spawn((Player, combatant_bundle(&spec, &tunables, &book)));
}

/// -1, 0 or +1 from the A/D pair.
pub fn move_axis(keys: &ButtonInput<KeyCode>) -> f32 {
    let mut axis = 0.0;
    if keys.pressed(KeyCode::KeyA) {
        axis -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis += 1.0;
    }
    axis
}

fn gather_move_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut q_player: Query<&mut MoveDriver, With<Player>>,
) {
    let Some(keys) = keys else {
        return;
    };
    let axis = move_axis(&keys);
    for mut driver in &mut q_player {
        if driver.input() != axis {
            driver.set_input(axis);
        }
    }
}

fn gather_skill_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    book: Res<SkillBook>,
    q_player: Query<Entity, With<Player>>,
    mut requests: MessageWriter<SkillRequest>,
) {
    let Some(keys) = keys else {
        return;
    };
    let Ok(player) = q_player.single() else {
        return;
    };
    for (key, skill) in SKILL_KEYS.iter().zip(book.skills()) {
        if keys.just_pressed(*key) {
            requests.write(SkillRequest::new(player, &skill.id));
        }
    }
}
