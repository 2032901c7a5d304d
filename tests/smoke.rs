mod common;

use duel_combat::plugins::actors::fsm::StateMachine;
use duel_combat::plugins::bot::Bot;
use duel_combat::plugins::player::Player;
use duel_combat::plugins::world::Terrain;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    for _ in 0..3 {
        app.update();
    }
}

#[test]
fn duel_spawns_both_combatants_and_the_arena() {
    let mut app = common::app_headless();
    common::run_for(&mut app, 0.2);

    let player = common::single::<Player>(&mut app);
    let bot = common::single::<Bot>(&mut app);
    assert_ne!(player, bot);

    let terrain = app
        .world_mut()
        .query::<&Terrain>()
        .iter(app.world())
        .count();
    assert_eq!(terrain, 3);

    // Both state machines have entered their first state.
    for e in [player, bot] {
        let machine = app.world().get::<StateMachine>(e).unwrap();
        assert!(machine.current().is_some());
    }
}

#[test]
fn bot_keeps_ticking_without_panicking() {
    let mut app = common::app_headless();
    common::run_for(&mut app, 5.0);

    let bot = common::single::<Bot>(&mut app);
    assert!(app.world().get::<StateMachine>(bot).unwrap().current().is_some());
}
