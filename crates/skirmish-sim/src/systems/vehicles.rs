//! Wave vehicles: scripted movement, contact damage and encounter stages.

use glam::Vec2;
use hecs::{Entity, World};
use log::{debug, warn};
use rand_chacha::ChaCha8Rng;

use skirmish_ai::profiles::HostileProfile;
use skirmish_core::components::*;
use skirmish_core::constants::{VEHICLE_CONTACT_COOLDOWN_SECS, VEHICLE_CONTACT_DAMAGE};
use skirmish_core::events::SimEvent;
use skirmish_core::types::Rect;

use crate::collision::CollisionManager;
use crate::encounter::{EncounterAction, EncounterSequence};
use crate::physics::PhysicsWorld;
use crate::systems::combat::{apply_damage, release_body};
use crate::systems::player::player_status;
use crate::systems::wave_scheduler::WaveScheduler;
use crate::world_setup::{combatant_bounds, entity_id, find_spawn_positions, spawn_hostile};

/// Shared state the encounter actions touch.
pub struct VehicleContext<'a> {
    pub physics: &'a mut dyn PhysicsWorld,
    pub collision: &'a mut CollisionManager,
    pub scheduler: &'a mut WaveScheduler,
    pub rng: &'a mut ChaCha8Rng,
    pub profile: &'a HostileProfile,
    pub map_size: Vec2,
    pub events: &'a mut Vec<SimEvent>,
}

/// Run the vehicle systems for one tick.
pub fn run(world: &mut World, ctx: &mut VehicleContext, dt: f32) {
    // 1. Scripted movement
    run_motion(world, ctx.physics, dt);

    // 2. Contact damage
    run_contact(world, ctx.physics, ctx.events, dt);

    // 3. Encounter stages
    let mut due: Vec<(Entity, Vec<EncounterAction>)> = Vec::new();
    for (entity, sequence) in world.query_mut::<&mut EncounterSequence>() {
        let mut actions = Vec::new();
        sequence.advance(dt, &mut actions);
        if !actions.is_empty() {
            due.push((entity, actions));
        }
    }
    for (entity, actions) in due {
        for action in actions {
            apply_action(world, ctx, entity, action);
        }
    }
}

fn run_motion(world: &mut World, physics: &mut dyn PhysicsWorld, dt: f32) {
    let mut arrived = Vec::new();
    for (entity, (pos, motion, binding)) in
        world.query_mut::<(&mut Position, &mut LinearMotion, &BodyBinding)>()
    {
        motion.elapsed_secs += dt;
        let t = if motion.duration_secs > 0.0 {
            (motion.elapsed_secs / motion.duration_secs).min(1.0)
        } else {
            1.0
        };
        pos.0 = motion.from.lerp(motion.to, t);
        if binding.live {
            physics.set_transform(binding.handle, pos.0);
        }
        if t >= 1.0 {
            arrived.push(entity);
        }
    }
    for entity in arrived {
        if let Err(err) = world.remove_one::<LinearMotion>(entity) {
            debug!("Motion end for {}: {err}", entity_id(entity));
        }
    }
}

fn vehicle_box(position: Vec2, vehicle: &Vehicle) -> Rect {
    Rect::from_center(position, vehicle.size)
}

fn run_contact(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    let player = player_status(world);
    let mut hits = Vec::new();
    for (_, (pos, vehicle)) in world.query_mut::<(&Position, &mut Vehicle)>() {
        vehicle.contact_cooldown = (vehicle.contact_cooldown - dt).max(0.0);
        let Some((target, target_pos, true)) = player else {
            continue;
        };
        if vehicle.contact_cooldown > 0.0 || !vehicle_box(pos.0, vehicle).contains_point(target_pos) {
            continue;
        }
        vehicle.contact_cooldown = VEHICLE_CONTACT_COOLDOWN_SECS;
        hits.push((target, (target_pos - pos.0).normalize_or_zero()));
    }
    for (target, direction) in hits {
        apply_damage(world, physics, events, target, VEHICLE_CONTACT_DAMAGE, direction);
    }
}

fn apply_action(world: &mut World, ctx: &mut VehicleContext, entity: Entity, action: EncounterAction) {
    match action {
        EncounterAction::ActivateCollision => set_collision(world, ctx.physics, entity, true),
        EncounterAction::DeactivateCollision => set_collision(world, ctx.physics, entity, false),
        EncounterAction::BeginMove {
            target,
            duration_secs,
        } => {
            let Ok(from) = world.get::<&Position>(entity).map(|p| p.0) else {
                return;
            };
            if let Err(err) = world.insert_one(
                entity,
                LinearMotion {
                    from,
                    to: target,
                    duration_secs,
                    elapsed_secs: 0.0,
                },
            ) {
                debug!("Motion start for {}: {err}", entity_id(entity));
            }
        }
        EncounterAction::OpenDoors => open_doors(world, ctx, entity),
        EncounterAction::SpawnHostiles { count } => unload(world, ctx, entity, count),
        EncounterAction::Deregister => {
            release_body(world, ctx.physics, entity);
            if let Err(err) = world.despawn(entity) {
                debug!("Vehicle {} deregister: {err}", entity_id(entity));
            }
        }
    }
}

fn set_collision(world: &mut World, physics: &mut dyn PhysicsWorld, entity: Entity, solid: bool) {
    if let Ok((vehicle, binding)) = world.query_one_mut::<(&mut Vehicle, &BodyBinding)>(entity) {
        vehicle.collision_active = solid;
        if binding.live {
            physics.set_solid(binding.handle, solid);
        }
    }
}

/// Open the doors once and register the parked footprint as an obstacle,
/// unless the controlled agent is standing in it.
fn open_doors(world: &mut World, ctx: &mut VehicleContext, entity: Entity) {
    let player_bounds = find_player_bounds(world);
    let Ok(vehicle) = world.query_one_mut::<&mut Vehicle>(entity) else {
        return;
    };
    if vehicle.doors_open {
        return;
    }
    vehicle.doors_open = true;

    let footprint = Rect::from_center(vehicle.spawn_rect.center(), vehicle.size);
    let trapped = player_bounds.is_some_and(|b| b.overlaps(&footprint));
    if !trapped {
        ctx.collision.add_obstacle(footprint);
    } else {
        warn!("Wave {} footprint skipped, agent inside", vehicle.wave);
    }
    ctx.events.push(SimEvent::DoorsOpened {
        wave: vehicle.wave,
        obstacle_registered: !trapped,
    });
}

fn find_player_bounds(world: &World) -> Option<Rect> {
    world
        .query::<(&Position, &Combatant, &PlayerControl)>()
        .iter()
        .map(|(_, (pos, c, _))| combatant_bounds(pos.0, c.body_radius))
        .next()
}

fn unload(world: &mut World, ctx: &mut VehicleContext, entity: Entity, count: u32) {
    let Ok((origin, wave)) = world
        .query_one_mut::<(&Position, &Vehicle)>(entity)
        .map(|(pos, vehicle)| (pos.0, vehicle.wave))
    else {
        return;
    };
    let positions = find_spawn_positions(origin, count, ctx.collision, ctx.map_size, ctx.rng);
    for position in positions {
        let hostile = spawn_hostile(world, ctx.physics, position, ctx.profile, Some(wave));
        ctx.events.push(SimEvent::HostileSpawned {
            id: entity_id(hostile),
            position,
            wave,
        });
    }
    ctx.scheduler.on_hostiles_spawned(count);
}
