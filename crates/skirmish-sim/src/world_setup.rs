//! Entity spawn factories and placement searches.
//!
//! Creates the controlled agent, hostiles, wave vehicles and cutscene
//! actors with their component bundles and physics bodies.

use glam::Vec2;
use hecs::{Entity, World};
use log::{debug, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::types::Rect;

use skirmish_ai::profiles::HostileProfile;

use crate::collision::CollisionManager;
use crate::encounter::EncounterSequence;
use crate::physics::{BodyDesc, BodyShape, PhysicsWorld};

/// Stable numeric id of an entity, used in events and snapshots.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Square hit box of a combatant.
pub fn combatant_bounds(position: Vec2, body_radius: f32) -> Rect {
    Rect::from_center(position, Vec2::splat(body_radius * 2.0))
}

fn combatant_body(physics: &mut dyn PhysicsWorld, position: Vec2, radius: f32) -> BodyBinding {
    let handle = physics.create_body(BodyDesc {
        position,
        shape: BodyShape::Circle { radius },
        solid: true,
        blocks_sight: false,
    });
    BodyBinding { handle, live: true }
}

/// Spawn the controlled agent facing right at full health.
pub fn spawn_player(world: &mut World, physics: &mut dyn PhysicsWorld, position: Vec2) -> Entity {
    let body = combatant_body(physics, position, PLAYER_BODY_RADIUS);
    world.spawn((
        Role::Player,
        Position(position),
        Velocity::default(),
        Health {
            current: PLAYER_HEALTH,
            max: PLAYER_HEALTH,
        },
        Combatant {
            faction: Faction::Player,
            body_radius: PLAYER_BODY_RADIUS,
            facing: Octant::Right,
            dead: false,
        },
        PlayerControl::default(),
        body,
    ))
}

/// Spawn one hostile. `wave` is set for hostiles delivered by the scheduler.
pub fn spawn_hostile(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    position: Vec2,
    profile: &HostileProfile,
    wave: Option<u32>,
) -> Entity {
    let body = combatant_body(physics, position, profile.body_radius);
    let entity = world.spawn((
        Role::Hostile,
        Position(position),
        Velocity::default(),
        Health {
            current: profile.health,
            max: profile.health,
        },
        Combatant {
            faction: Faction::Hostile,
            body_radius: profile.body_radius,
            facing: Octant::Down,
            dead: false,
        },
        HostileBrain::default(),
        body,
    ));
    if let Some(wave) = wave {
        if let Err(err) = world.insert_one(entity, WaveMember { wave }) {
            debug!("Wave tag for {}: {err}", entity_id(entity));
        }
    }
    entity
}

/// Spawn a wave vehicle on the top edge above its bay, carrying its
/// arrival sequence.
pub fn spawn_vehicle(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    spawn_rect: Rect,
    map_height: f32,
    hostiles: u32,
    wave: u32,
) -> Entity {
    let bay = spawn_rect.center();
    let start = Vec2::new(bay.x, map_height);
    let size = Vec2::new(VEHICLE_SIZE.0, VEHICLE_SIZE.1);
    let handle = physics.create_body(BodyDesc {
        position: start,
        shape: BodyShape::Box {
            half_extents: size * 0.5,
        },
        solid: false,
        blocks_sight: true,
    });
    world.spawn((
        Role::Vehicle,
        Position(start),
        Vehicle {
            size,
            spawn_rect,
            hostiles,
            wave,
            doors_open: false,
            collision_active: false,
            contact_cooldown: 0.0,
        },
        EncounterSequence::vehicle_arrival(bay, hostiles),
        BodyBinding { handle, live: true },
    ))
}

/// Spawn a cutscene actor on a random edge of the map.
pub fn spawn_cutscene_actor(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    kind: CutsceneKind,
    map_size: Vec2,
) -> Entity {
    let position = match rng.gen_range(0..4) {
        0 => Vec2::new(0.0, rng.gen_range(0.0..map_size.y)),
        1 => Vec2::new(map_size.x, rng.gen_range(0.0..map_size.y)),
        2 => Vec2::new(rng.gen_range(0.0..map_size.x), 0.0),
        _ => Vec2::new(rng.gen_range(0.0..map_size.x), map_size.y),
    };
    world.spawn((
        Role::Scripted,
        Position(position),
        Velocity::default(),
        CutsceneActor {
            kind,
            stage: CutsceneStage::Approaching,
            line: 0,
            facing: Octant::Down,
            advance_requested: false,
        },
    ))
}

fn spawn_point_clear(
    candidate: Vec2,
    placed: &[Vec2],
    collision: &CollisionManager,
) -> bool {
    let clearance = Rect::from_center(candidate, Vec2::splat(SPAWN_CLEARANCE));
    !collision.query_overlaps(&clearance)
        && placed
            .iter()
            .all(|p| p.distance(candidate) >= SPAWN_MIN_SPACING)
}

fn clamp_to_map(p: Vec2, map_size: Vec2) -> Vec2 {
    let margin = Vec2::splat(SPAWN_EDGE_MARGIN);
    p.clamp(margin, (map_size - margin).max(margin))
}

fn random_map_point(rng: &mut ChaCha8Rng, map_size: Vec2) -> Vec2 {
    let hi = (map_size - Vec2::splat(SPAWN_EDGE_MARGIN)).max(Vec2::splat(SPAWN_EDGE_MARGIN + 1.0));
    Vec2::new(
        rng.gen_range(SPAWN_EDGE_MARGIN..hi.x),
        rng.gen_range(SPAWN_EDGE_MARGIN..hi.y),
    )
}

/// Find spawn positions for `count` hostiles around a parked vehicle.
///
/// Tries alternating left/right offsets that step outward while the base
/// gap shrinks, then random points anywhere on the map, and finally
/// accepts an unchecked random point so a spawn never fails.
pub fn find_spawn_positions(
    origin: Vec2,
    count: u32,
    collision: &CollisionManager,
    map_size: Vec2,
    rng: &mut ChaCha8Rng,
) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let position = ring_search(origin, &placed, collision, map_size, rng)
            .or_else(|| map_search(&placed, collision, map_size, rng))
            .unwrap_or_else(|| {
                warn!("Spawn search exhausted near {origin}, placing unchecked");
                random_map_point(rng, map_size)
            });
        placed.push(position);
    }
    placed
}

fn ring_search(
    origin: Vec2,
    placed: &[Vec2],
    collision: &CollisionManager,
    map_size: Vec2,
    rng: &mut ChaCha8Rng,
) -> Option<Vec2> {
    let mut gap = SPAWN_RING_GAP;
    for attempt in 0..SPAWN_RING_ATTEMPTS {
        for side in [-1.0_f32, 1.0] {
            let jitter = rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER) as f32;
            let candidate = clamp_to_map(
                Vec2::new(
                    origin.x + side * gap * (attempt + 1) as f32,
                    origin.y + SPAWN_LATERAL_OFFSET + jitter,
                ),
                map_size,
            );
            if spawn_point_clear(candidate, placed, collision) {
                return Some(candidate);
            }
        }
        gap *= SPAWN_RING_DECAY;
    }
    None
}

fn map_search(
    placed: &[Vec2],
    collision: &CollisionManager,
    map_size: Vec2,
    rng: &mut ChaCha8Rng,
) -> Option<Vec2> {
    (0..SPAWN_FALLBACK_ATTEMPTS)
        .map(|_| random_map_point(rng, map_size))
        .find(|&candidate| spawn_point_clear(candidate, placed, collision))
}

/// Pick a start position for the controlled agent near the cutscene zone,
/// clear of obstacles and not already inside the zone.
pub fn find_player_spawn(
    zone: Rect,
    collision: &CollisionManager,
    rng: &mut ChaCha8Rng,
) -> Vec2 {
    let area = zone.expanded(PLAYER_SPAWN_PADDING);
    for _ in 0..PLAYER_SPAWN_ATTEMPTS {
        let candidate = Vec2::new(
            rng.gen_range(area.x..area.x + area.width),
            rng.gen_range(area.y..area.y + area.height),
        );
        let bounds = combatant_bounds(candidate, PLAYER_BODY_RADIUS);
        if !collision.query_overlaps(&bounds) && !zone.contains_rect(&bounds) {
            return candidate;
        }
    }
    Vec2::new(PLAYER_SPAWN_FALLBACK.0, PLAYER_SPAWN_FALLBACK.1)
}
