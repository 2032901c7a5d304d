//! Camera plugin: keeps both combatants in frame.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera -> write MainCameraEntity resource
//! PostUpdate:      follow_duel eases toward the combatants' midpoint
//! ```
//!
//! `Without<...>` filters keep the camera and actor transform queries disjoint (B0001).

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::actors::components::Actor;

/// World metres visible vertically.
const VIEW_HEIGHT: f32 = 14.0;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct MainCameraEntity(pub Option<Entity>);

pub fn plugin(app: &mut App) {
    app.init_resource::<MainCameraEntity>()
        .add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_duel
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    let e = commands
        .spawn((
            Name::new("MainCamera"),
            Camera2d,
            MainCamera { responsiveness: 3.0 },
            Projection::Orthographic(OrthographicProjection {
                scaling_mode: ScalingMode::FixedVertical { viewport_height: VIEW_HEIGHT },
                ..OrthographicProjection::default_2d()
            }),
            Transform::from_xyz(0.0, 0.0, 999.0),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    commands.insert_resource(MainCameraEntity(Some(e)));
}

fn follow_duel(
    time: Res<Time>,
    cam_e: Res<MainCameraEntity>,
    q_actors: Query<&Transform, (With<Actor>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Actor>>,
) {
    let Some(cam) = cam_e.0 else {
        return;
    };
    let Ok((mut tf_cam, main_cam)) = q_cam.get_mut(cam) else {
        return;
    };

    let (sum, count) = q_actors
        .iter()
        .fold((Vec2::ZERO, 0u32), |(s, n), tf| (s + tf.translation.truncate(), n + 1));
    if count == 0 {
        return;
    }
    let target = sum / count as f32;

    let alpha = 1.0 - (-main_cam.responsiveness * time.delta_secs()).exp();
    tf_cam.translation.x += (target.x - tf_cam.translation.x) * alpha;
    tf_cam.translation.y += (target.y - tf_cam.translation.y) * alpha;
}
