//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `duel_combat::game::configure_headless` to install gameplay plugins.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

pub const STEP: Duration = Duration::from_millis(20);

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    duel_combat::game::configure_headless(&mut app);
    // Every update advances the clock by a fixed step so timings are reproducible.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app
}

pub fn run_for(app: &mut App, seconds: f32) {
    let steps = (seconds / STEP.as_secs_f32()).ceil() as u32;
    for _ in 0..steps {
        app.update();
    }
}

pub fn single<C: Component>(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .single(app.world())
        .expect("exactly one entity")
}
