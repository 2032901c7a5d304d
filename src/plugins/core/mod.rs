//! Core plugin: shared resources, global settings and system ordering.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::rng::CombatRng;
use crate::common::sets::{FrameSet, PostTickSet, TickSet};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    // A caller may have inserted its own Tunables (e.g. loaded from JSON) before us.
    app.init_resource::<Tunables>();
    let seed = app.world().resource::<Tunables>().rng_seed;
    app.insert_resource(seed.map_or_else(CombatRng::from_entropy, CombatRng::from_seed));
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));

    app.configure_sets(
        Update,
        (
            FrameSet::Input,
            FrameSet::Animation,
            FrameSet::Logic,
            FrameSet::Shoot,
            FrameSet::Effects,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.configure_sets(
        FixedUpdate,
        (TickSet::Sense, TickSet::Act, TickSet::Drive)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.configure_sets(
        FixedPostUpdate,
        (PostTickSet::Resolve, PostTickSet::Effects)
            .chain()
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}
