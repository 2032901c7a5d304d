//! World plugin: spawns the duel arena (floor + side walls).

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

/// Terrain marker. Projectiles stick to it, probes stand on it.
#[derive(Component, Debug, Clone, Copy)]
pub struct Terrain;

const THICKNESS: f32 = 1.0;
const WALL_HEIGHT: f32 = 12.0;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_arena);
}

#[inline]
pub fn ground_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Ground,
        [Layer::Player, Layer::Bot, Layer::Projectile],
    )
}

fn spawn_arena(mut commands: Commands, tunables: Res<Tunables>) {
    let half_w = tunables.world.arena_half_width;
    let floor_top = tunables.world.floor_y;
    let ground_color = Color::srgb(0.25, 0.27, 0.33);

    let mut spawn_slab = |name: &'static str, center: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Terrain,
            Sprite {
                color: ground_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            ground_layers(),
            DespawnOnExit(GameState::InGame),
        ));
    };

    spawn_slab(
        "Floor",
        Vec2::new(0.0, floor_top - THICKNESS * 0.5),
        Vec2::new(half_w * 2.0 + THICKNESS * 2.0, THICKNESS),
    );
    spawn_slab(
        "WallLeft",
        Vec2::new(-half_w - THICKNESS * 0.5, floor_top + WALL_HEIGHT * 0.5),
        Vec2::new(THICKNESS, WALL_HEIGHT),
    );
    spawn_slab(
        "WallRight",
        Vec2::new(half_w + THICKNESS * 0.5, floor_top + WALL_HEIGHT * 0.5),
        Vec2::new(THICKNESS, WALL_HEIGHT),
    );
}
