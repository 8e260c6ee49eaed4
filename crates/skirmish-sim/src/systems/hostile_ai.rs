//! Hostile AI system: perception, FSM, steering, regen and attacks.
//!
//! Gathers each hostile's situation, evaluates the FSM from skirmish-ai,
//! then applies the results in a second pass to avoid borrow conflicts
//! with hecs.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::LOS_OBSTACLE_BUFFER;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;

use skirmish_ai::fsm::{evaluate, HostileContext, MoveIntent};
use skirmish_ai::perception::{self, SightReport};
use skirmish_ai::profiles::HostileProfile;
use skirmish_ai::steering::{self, Neighbor};

use crate::collision::CollisionManager;
use crate::physics::PhysicsWorld;
use crate::projectile::ProjectilePool;
use crate::systems::player::player_status;
use crate::world_setup::{combatant_bounds, entity_id};

struct HostileResult {
    entity: Entity,
    brain: HostileBrain,
    position: Vec2,
    velocity: Vec2,
    facing: Octant,
    health: i32,
    shot: Option<Vec2>,
}

/// Run the hostile AI for one tick. Hostiles do nothing while the
/// controlled agent is dead or absent.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    collision: &CollisionManager,
    pool: &mut ProjectilePool,
    rng: &mut ChaCha8Rng,
    profile: &HostileProfile,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    let Some((_, target, true)) = player_status(world) else {
        return;
    };

    let neighbors: Vec<Neighbor> = world
        .query::<(&HostileBrain, &Position, &Combatant)>()
        .iter()
        .filter(|(_, (_, _, c))| !c.dead)
        .map(|(e, (_, pos, _))| Neighbor {
            key: entity_id(e),
            position: pos.0,
        })
        .collect();

    let hostiles: Vec<(Entity, HostileBrain, Vec2, Health, Octant)> = world
        .query::<(&HostileBrain, &Position, &Health, &Combatant)>()
        .iter()
        .filter(|(_, (_, _, _, c))| !c.dead)
        .map(|(e, (brain, pos, health, c))| (e, brain.clone(), pos.0, *health, c.facing))
        .collect();

    let mut results = Vec::with_capacity(hostiles.len());
    for (entity, brain, position, health, facing) in hostiles {
        results.push(think(
            entity, brain, position, health, facing, target, &neighbors, physics, collision,
            rng, profile, dt,
        ));
    }

    for result in results {
        if let Ok((brain, pos, vel, health, combatant, binding)) =
            world.query_one_mut::<(
                &mut HostileBrain,
                &mut Position,
                &mut Velocity,
                &mut Health,
                &mut Combatant,
                &BodyBinding,
            )>(result.entity)
        {
            *brain = result.brain;
            pos.0 = result.position;
            vel.0 = result.velocity;
            health.current = result.health;
            combatant.facing = result.facing;
            if binding.live {
                physics.set_transform(binding.handle, result.position);
            }
        }

        if let Some(direction) = result.shot {
            pool.spawn(
                result.position,
                direction * profile.bullet_speed,
                profile.bullet_damage,
                result.entity,
                Faction::Hostile,
            );
            events.push(SimEvent::ProjectileFired {
                faction: Faction::Hostile,
                position: result.position,
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn think(
    entity: Entity,
    mut brain: HostileBrain,
    position: Vec2,
    mut health: Health,
    facing: Octant,
    target: Vec2,
    neighbors: &[Neighbor],
    physics: &dyn PhysicsWorld,
    collision: &CollisionManager,
    rng: &mut ChaCha8Rng,
    profile: &HostileProfile,
    dt: f32,
) -> HostileResult {
    let key = entity_id(entity);
    let distance = position.distance(target);

    // Perception
    let (ray_from, ray_to) = perception::ray_endpoints(position, target);
    let report = SightReport {
        distance,
        ray_blocked: physics.ray_cast(ray_from, ray_to).is_some(),
        obstacle_blocked: collision.segment_blocked(ray_from, ray_to, LOS_OBSTACLE_BUFFER),
    };
    let sighted = perception::resolve_sight(&report, profile);
    if sighted {
        brain.last_known_target = Some(target);
    }

    if brain.state == HostileState::Attack {
        brain.attack_elapsed += dt;
    }

    let ctx = HostileContext {
        state: brain.state,
        distance,
        sighted,
        adjacent: perception::is_adjacent(distance, profile),
        moving: brain.moving,
        has_last_known: brain.last_known_target.is_some(),
        attack_elapsed: brain.attack_elapsed,
        last_attack_frame: brain.last_attack_frame,
    };
    let update = evaluate(&ctx, profile);
    brain.state = update.new_state;
    brain.attack_elapsed = update.attack_elapsed;
    brain.last_attack_frame = update.last_attack_frame;

    // Steering
    let avoidance = || {
        steering::obstacle_avoidance(position, collision.rects(), profile.avoidance_radius)
            + steering::neighbor_repulsion(
                key,
                position,
                neighbors,
                profile.separation_radius,
                profile.separation_gain,
            )
    };
    let mut velocity = match update.intent {
        MoveIntent::Hold => Vec2::ZERO,
        MoveIntent::SeekTarget => {
            steering::desired_velocity(steering::seek(position, target), avoidance(), profile)
        }
        MoveIntent::SeekLastKnown => match brain.last_known_target {
            Some(last) if position.distance(last) >= profile.arrival_distance => {
                steering::desired_velocity(steering::seek(position, last), avoidance(), profile)
            }
            _ => Vec2::ZERO,
        },
        MoveIntent::Wander => {
            brain.wander_timer -= dt;
            let wander_target = match brain.wander_target {
                Some(t) if brain.wander_timer > 0.0 => t,
                _ => {
                    brain.wander_timer = profile.wander_retarget_secs;
                    steering::pick_wander_target(position, rng, profile)
                }
            };
            brain.wander_target = Some(wander_target);
            if position.distance(wander_target) < profile.arrival_distance {
                Vec2::ZERO
            } else {
                steering::wander_velocity(position, wander_target, profile)
            }
        }
    };
    brain.moving = velocity != Vec2::ZERO;

    // Anti-stacking push, not while attacking.
    if brain.state != HostileState::Attack {
        velocity += steering::stacking_separation(key, position, neighbors, profile)
            * profile.max_speed;
    }

    let mut new_position = position;
    if velocity != Vec2::ZERO {
        let candidate = position + velocity * dt;
        if collision.query_overlaps(&combatant_bounds(candidate, profile.body_radius)) {
            // Stop rather than slide.
            velocity = Vec2::ZERO;
            brain.moving = false;
        } else {
            new_position = candidate;
        }
    }

    if brain.state == HostileState::Walk && !brain.moving {
        brain.state = HostileState::Idle;
    }

    // Facing
    let to_target = target - new_position;
    let facing_vec = if brain.state == HostileState::Attack {
        to_target
    } else if brain.moving && velocity != Vec2::ZERO {
        velocity
    } else if brain.moving {
        to_target
    } else {
        Octant::Down.direction()
    };
    let facing = Octant::from_vector(facing_vec).unwrap_or(facing);

    // Idle regen
    if brain.state == HostileState::Idle {
        brain.idle_secs += dt;
        if brain.idle_secs > profile.regen_delay_secs && health.current < health.max {
            brain.regen_carry += profile.regen_per_sec * dt;
            let whole = brain.regen_carry.floor();
            brain.regen_carry -= whole;
            health.current = (health.current + whole as i32).min(health.max);
        }
    } else {
        brain.idle_secs = 0.0;
        brain.regen_carry = 0.0;
    }

    let shot = update.fire.then(|| {
        let aim = to_target.normalize_or_zero();
        if aim == Vec2::ZERO {
            facing.direction()
        } else {
            aim
        }
    });

    HostileResult {
        entity,
        brain,
        position: new_position,
        velocity,
        facing,
        health: health.current,
        shot,
    }
}
