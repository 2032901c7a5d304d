//! Physics plugin: avian setup and the grounded predicate.
//!
//! `Grounded` is refreshed once per physics tick by a short downward ray from the body's
//! centre. Everything else in the combat core only reads it.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{layers::Layer, sets::TickSet, tunables::Tunables};

/// Externally computed ground contact. Read-only to gameplay.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Grounded(pub bool);

/// How far below the body's centre the ground may be and still count as contact.
#[derive(Component, Debug, Clone, Copy)]
pub struct GroundProbe {
    pub depth: f32,
}

impl GroundProbe {
    pub const SKIN: f32 = 0.06;

    pub fn for_half_height(half_height: f32) -> Self {
        Self { depth: half_height + Self::SKIN }
    }
}

pub fn plugin(app: &mut App) {
    let world = app.world().resource::<Tunables>().world.clone();
    app.add_plugins(PhysicsPlugins::default().with_length_unit(world.length_unit));
    app.insert_resource(Gravity(Vec2::NEG_Y * world.gravity));
    app.add_systems(FixedUpdate, refresh_grounded.in_set(TickSet::Sense));
}

fn refresh_grounded(
    spatial: SpatialQuery,
    mut q: Query<(&GlobalTransform, &GroundProbe, &mut Grounded)>,
) {
    let filter = SpatialQueryFilter::from_mask(Layer::Ground);
    for (tf, probe, mut grounded) in &mut q {
        let origin = tf.translation().truncate();
        let hit = spatial.cast_ray(origin, Dir2::NEG_Y, probe.depth, true, &filter);
        let now_grounded = hit.is_some();
        if grounded.0 != now_grounded {
            grounded.0 = now_grounded;
        }
    }
}
