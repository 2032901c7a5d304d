mod common;

use duel_combat::plugins::actors::components::Actor;
use duel_combat::plugins::player::Player;
use duel_combat::plugins::skills::SkillRequest;
use duel_combat::plugins::skills::selector::SkillSelector;

#[test]
fn requested_skill_casts_to_completion_and_starts_its_cooldown() {
    let mut app = common::app_headless();
    common::run_for(&mut app, 0.5);

    let player = common::single::<Player>(&mut app);
    app.world_mut().write_message(SkillRequest::new(player, "multi_shot"));
    app.update();
    assert!(app.world().get::<Actor>(player).unwrap().is_casting());

    // Charge pause plus the clip up to its skill-end event.
    common::run_for(&mut app, 3.0);
    assert!(!app.world().get::<Actor>(player).unwrap().is_casting());

    let now = app
        .world()
        .resource::<bevy::prelude::Time<bevy::prelude::Virtual>>()
        .elapsed_secs();
    let selector = app.world().get::<SkillSelector>(player).unwrap();
    assert!(!selector.is_ready("multi_shot", now));
    assert!(selector.cooldown_remaining("multi_shot", now) > 0.0);
}
