//! Bot plugin: the autonomous combatant.
//!
//! Spawns on the right. Its state machine runs the patrol and idle-attack variants, so there is
//! no input system here.

use bevy::prelude::*;

use crate::common::{state::GameState, team::Team, tunables::Tunables};
use crate::plugins::actors::spawn::{CombatantSpec, combatant_bundle};
use crate::plugins::skills::data::SkillBook;

#[derive(Component)]
pub struct Bot;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn);
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>, book: Res<SkillBook>) {
    let spec = CombatantSpec {
        name: "Bot",
        team: Team::Bot,
        autonomous: true,
        side: 1.0,
        color: Color::srgb(0.9, 0.35, 0.3),
    };
    commands.spawn((Bot, combatant_bundle(&spec, &tunables, &book)));
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::Bot;
    use crate::common::test_utils::run_system_once;
    use crate::common::tunables::Tunables;
    use crate::plugins::actors::components::{Actor, Opponent};
    use crate::common::team::Team;
    use crate::plugins::skills::data::SkillBook;

    #[test]
    fn spawns_an_autonomous_combatant_seeking_the_player() {
        let mut world = World::new();
        world.insert_resource(Tunables::default());
        world.insert_resource(SkillBook::default());
        run_system_once(&mut world, super::spawn);

        let (actor, opponent, tf) = world
            .query_filtered::<(&Actor, &Opponent, &Transform), With<Bot>>()
            .single(&world)
            .unwrap();
        assert!(actor.is_autonomous());
        assert_eq!(opponent.seek, Team::Player);
        assert!(tf.translation.x > 0.0);
    }
}
