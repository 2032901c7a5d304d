//! Projectiles plugin: **message-based producer → consumer** firing over per-prototype pools.
//!
//! # Data flow (big picture)
//! ```text
//!   Update schedule (variable dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producers: idle attack loop, skill strategies                         │
//!│      - writes: FireRequest { shooter, target snapshot, overrides }         │
//!│                                                                            │
//!│  (B) Consumer: fire_projectiles (FrameSet::Shoot)                          │
//!│      - reads: FireRequest, Shooter, Gravity, ProjectilePrototypes          │
//!│      - mutates: ProjectilePools (acquire, lazy warm, grow on demand)       │
//!│      - writes: Projectile, ProjectileState::Flying, body/velocity/filters  │
//!│                                                                            │
//!│  (C) orient_to_velocity                                                    │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!FixedPostUpdate (fixed dt), after CollisionEventSystems
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (D) sweep_ground: segment ray prev → current, ground hit ⇒ Stuck          │
//!│  (E) resolve_projectile_collisions: ground fallback ⇒ Stuck,               │
//!│      damageable ⇒ DamageSink, ProjectileHit, PendingReturn                 │
//!│  (F) expire_projectiles: flight / stick deadline ⇒ PendingReturn           │
//!│  (G) return_to_pool_commit: PendingReturn ⇒ Inactive, release to pool      │
//!└────────────────────────────────────────────────────────────────────────────┘
//!
//! Feedback loop:
//!   commit releases the instance into ProjectilePools
//!   the allocator acquires it again
//! ```
//!
//! Producers never borrow `ResMut<ProjectilePools>`; they only enqueue intent. The allocator
//! is the single writer that acquires and the commit the single writer that releases.

pub mod collision;
pub mod commit;
pub mod components;
pub mod flight;
pub mod messages;
pub mod pool;
pub mod prototypes;
pub mod shooter;

use bevy::prelude::*;

use crate::common::sets::{FrameSet, PostTickSet};
use crate::common::tunables::Tunables;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let warm = app.world().resource::<Tunables>().projectiles.pool_initial_size;

        app.insert_resource(pool::ProjectilePools::new(warm))
            .init_resource::<prototypes::ProjectilePrototypes>()
            .add_message::<shooter::FireRequest>()
            .add_message::<messages::ProjectileHit>()
            .add_message::<messages::ProjectileStuck>()
            .add_systems(Startup, shooter::prewarm_default_pool);

        app.add_systems(
            Update,
            (shooter::fire_projectiles, flight::orient_to_velocity)
                .chain()
                .in_set(FrameSet::Shoot),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                flight::sweep_ground,
                collision::resolve_projectile_collisions,
                flight::expire_projectiles,
                commit::return_to_pool_commit,
            )
                .chain()
                .in_set(PostTickSet::Resolve),
        );
    }
}

#[cfg(test)]
mod tests;
