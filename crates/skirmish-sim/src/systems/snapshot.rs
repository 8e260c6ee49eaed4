//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;
use skirmish_core::state::*;
use skirmish_core::types::SimTime;

use crate::projectile::ProjectilePool;
use crate::world_setup::entity_id;

use super::cutscene::lines;

/// Everything outside the ECS world that the snapshot reports.
pub struct SnapshotContext<'a> {
    pub time: SimTime,
    pub phase: GamePhase,
    pub paused: bool,
    pub pool: &'a ProjectilePool,
    pub waves: WaveView,
    pub obstacle_count: usize,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    ctx: SnapshotContext,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: ctx.time,
        phase: ctx.phase,
        paused: ctx.paused,
        player: build_player(world),
        hostiles: build_hostiles(world),
        projectiles: build_projectiles(ctx.pool),
        vehicles: build_vehicles(world),
        cutscene: build_cutscene(world),
        waves: ctx.waves,
        obstacle_count: ctx.obstacle_count,
        pool_capacity: ctx.pool.capacity(),
        events,
    }
}

fn build_player(world: &World) -> Option<PlayerView> {
    world
        .query::<(&Position, &Health, &Combatant, &PlayerControl)>()
        .iter()
        .next()
        .map(|(_, (pos, health, combatant, control))| PlayerView {
            position: pos.0,
            health: health.current,
            max_health: health.max,
            state: control.state,
            weapon: control.weapon,
            facing: combatant.facing.player_index(),
        })
}

/// Hostile views sorted by id so snapshots compare stably.
fn build_hostiles(world: &World) -> Vec<HostileView> {
    let mut hostiles: Vec<HostileView> = world
        .query::<(&Position, &Health, &Combatant, &HostileBrain)>()
        .iter()
        .map(|(entity, (pos, health, combatant, brain))| HostileView {
            id: entity_id(entity),
            position: pos.0,
            health: health.current,
            state: brain.state,
            facing: combatant.facing.hostile_index(),
        })
        .collect();
    hostiles.sort_by_key(|h| h.id);
    hostiles
}

fn build_projectiles(pool: &ProjectilePool) -> Vec<ProjectileView> {
    pool.iter_active()
        .map(|p| ProjectileView {
            position: p.position,
            velocity: p.velocity,
            faction: p.faction,
        })
        .collect()
}

fn build_vehicles(world: &World) -> Vec<VehicleView> {
    let mut vehicles: Vec<(u64, VehicleView)> = world
        .query::<(&Position, &Vehicle)>()
        .iter()
        .map(|(entity, (pos, vehicle))| {
            (
                entity_id(entity),
                VehicleView {
                    position: pos.0,
                    size: vehicle.size,
                    doors_open: vehicle.doors_open,
                    collision_active: vehicle.collision_active,
                },
            )
        })
        .collect();
    vehicles.sort_by_key(|(id, _)| *id);
    vehicles.into_iter().map(|(_, view)| view).collect()
}

fn build_cutscene(world: &World) -> Option<CutsceneView> {
    world
        .query::<(&Position, &CutsceneActor)>()
        .iter()
        .next()
        .map(|(_, (pos, actor))| CutsceneView {
            kind: actor.kind,
            stage: actor.stage,
            position: pos.0,
            facing: actor.facing.player_index(),
            line: (actor.stage == CutsceneStage::Dialog)
                .then(|| lines(actor.kind).get(actor.line))
                .flatten()
                .map(|line| line.to_string()),
        })
}
