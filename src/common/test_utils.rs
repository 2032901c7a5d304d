//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; applying them is normally handled by
//! `ApplyDeferred` / schedule boundaries. We call `world.flush()` after running so queued commands
//! are applied before assertions.

use std::time::Duration;

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Pin the gameplay clock at `now` and the schedule delta at `dt`.
pub fn set_clock(world: &mut World, now: f32, dt: f32) {
    let mut virt = Time::<Virtual>::default();
    virt.advance_to(Duration::from_secs_f32(now));
    world.insert_resource(virt);

    let mut generic = Time::<()>::default();
    generic.advance_by(Duration::from_secs_f32(dt));
    world.insert_resource(generic);
}

/// Make sure the message buffer exists so readers/writers validate.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

/// Drain every pending message of type `M` into a Vec.
pub fn drain_messages<M: Message + Clone>(world: &mut World) -> Vec<M> {
    ensure_messages::<M>(world);
    world.resource_mut::<Messages<M>>().drain().collect()
}
