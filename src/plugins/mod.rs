//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod actors;
pub mod animation;
pub mod bot;
pub mod core;
pub mod cues;
pub mod effects;
pub mod health;
pub mod mover;
pub mod physics;
pub mod player;
pub mod projectiles;
pub mod skills;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    health::plugin(app);
    cues::plugin(app);
    mover::plugin(app);
    animation::plugin(app);
    // Skill clips are registered into the animation plugin's library.
    skills::plugin(app);
    actors::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    effects::plugin(app);
    player::plugin(app);
    bot::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
