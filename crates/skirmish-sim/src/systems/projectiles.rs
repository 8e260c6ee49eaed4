//! Projectile integration, hit resolution and recycling.

use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::events::SimEvent;

use crate::collision::CollisionManager;
use crate::physics::PhysicsWorld;
use crate::projectile::ProjectilePool;
use crate::systems::combat::{apply_damage, DamageOutcome};
use crate::world_setup::combatant_bounds;

/// Advance every active projectile one tick.
///
/// A projectile hits the first living combatant of the opposing faction
/// whose box it overlaps (never its owner), otherwise it is recycled on
/// contact with an obstacle. With a lifetime set, projectiles older than
/// it are recycled too.
pub fn run(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    collision: &CollisionManager,
    pool: &mut ProjectilePool,
    events: &mut Vec<SimEvent>,
    lifetime_secs: Option<f32>,
    dt: f32,
) {
    for id in pool.active_ids() {
        let Some(projectile) = pool.get_mut(id) else {
            continue;
        };
        if !projectile.active {
            continue;
        }
        projectile.position += projectile.velocity * dt;
        projectile.age_secs += dt;
        let projectile = projectile.clone();

        if lifetime_secs.is_some_and(|limit| projectile.age_secs > limit) {
            pool.free(id);
            continue;
        }

        let bounds = projectile.bounds();
        let target = world
            .query::<(&Position, &Combatant)>()
            .iter()
            .filter(|(e, (_, c))| {
                !c.dead && c.faction != projectile.faction && Some(*e) != projectile.owner
            })
            .filter(|(_, (pos, c))| combatant_bounds(pos.0, c.body_radius).overlaps(&bounds))
            .map(|(e, _)| e)
            .min_by_key(|e: &Entity| e.to_bits());

        if let Some(target) = target {
            let direction = projectile.velocity.normalize_or_zero();
            let outcome = apply_damage(world, physics, events, target, projectile.damage, direction);
            if outcome != DamageOutcome::Ignored {
                pool.free(id);
                continue;
            }
        }

        if collision.query_overlaps(&bounds) {
            pool.free(id);
        }
    }
}
