//! Cleanup system: removes dead hostiles once their death animation played.

use hecs::{Entity, World};
use log::debug;

use skirmish_core::components::DeathTimer;

use crate::world_setup::entity_id;

/// Count down death timers and despawn entities whose timer ran out.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>, dt: f32) {
    despawn_buffer.clear();

    for (entity, timer) in world.query_mut::<&mut DeathTimer>() {
        timer.remaining_secs -= dt;
        if timer.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for &entity in despawn_buffer.iter() {
        if let Err(err) = world.despawn(entity) {
            debug!("Despawn {}: {err}", entity_id(entity));
        }
    }
}
