//! Controlled agent: input handling, movement, ranged and melee attacks.
//!
//! Input arrives through the command helpers (`set_input`, `press_attack`,
//! ...) and is applied on the next `run`.

use glam::Vec2;
use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;
use skirmish_core::types::Rect;

use crate::collision::CollisionManager;
use crate::physics::PhysicsWorld;
use crate::projectile::ProjectilePool;
use crate::systems::combat::{self, DamageOutcome};
use crate::world_setup::{combatant_bounds, entity_id};

/// The controlled agent, if spawned.
pub fn find_player(world: &World) -> Option<Entity> {
    world
        .query::<&PlayerControl>()
        .iter()
        .next()
        .map(|(entity, _)| entity)
}

/// Position and liveness of the controlled agent.
pub fn player_status(world: &World) -> Option<(Entity, Vec2, bool)> {
    world
        .query::<(&PlayerControl, &Position, &Combatant)>()
        .iter()
        .next()
        .map(|(entity, (_, pos, combatant))| (entity, pos.0, !combatant.dead))
}

// --- Command helpers ---

pub fn set_input(world: &mut World, x: f32, y: f32) {
    let input = Vec2::new(x, y);
    let input = if input.is_finite() {
        input.clamp_length_max(1.0)
    } else {
        Vec2::ZERO
    };
    for (_entity, control) in world.query_mut::<&mut PlayerControl>() {
        if control.state != PlayerState::Death {
            control.input = input;
        }
    }
}

pub fn press_attack(world: &mut World) {
    for (_entity, control) in world.query_mut::<&mut PlayerControl>() {
        if control.state == PlayerState::Death {
            continue;
        }
        control.trigger_held = true;
        match control.weapon {
            WeaponMode::Ranged if control.state != PlayerState::Shooting => {
                control.state = PlayerState::Shooting;
                control.attack_elapsed = 0.0;
                control.last_shot_frame = -1;
            }
            WeaponMode::Melee if control.state != PlayerState::MeleeAttack => {
                control.state = PlayerState::MeleeAttack;
                control.attack_elapsed = 0.0;
                control.melee_has_hit = false;
            }
            _ => {}
        }
    }
}

pub fn release_attack(world: &mut World) {
    for (_entity, control) in world.query_mut::<&mut PlayerControl>() {
        control.trigger_held = false;
        // Ranged fire stops at once, a melee swing plays out.
        if control.state == PlayerState::Shooting {
            control.state = PlayerState::Idle;
        }
    }
}

pub fn switch_weapon(world: &mut World, weapon: WeaponMode) {
    for (_entity, control) in world.query_mut::<&mut PlayerControl>() {
        if control.state == PlayerState::Death || control.weapon == weapon {
            continue;
        }
        control.weapon = weapon;
        control.state = PlayerState::Idle;
        control.attack_elapsed = 0.0;
        control.last_shot_frame = -1;
        control.melee_has_hit = false;
    }
}

/// Turn the agent toward a point (used by cutscene actors).
pub fn face_toward(world: &mut World, target: Vec2) {
    for (_entity, (pos, combatant, control)) in
        world.query_mut::<(&Position, &mut Combatant, &mut PlayerControl)>()
    {
        if let Some(octant) = Octant::from_vector(target - pos.0) {
            combatant.facing = octant;
            control.aim = octant.direction();
        }
    }
}

// --- Per-tick update ---

/// Muzzle position for a shot along `aim` while facing `facing`.
pub fn muzzle_position(position: Vec2, aim: Vec2, facing: Octant) -> Vec2 {
    let nudge = match facing.player_index() {
        7 => Vec2::new(6.0, -3.0),
        4 => Vec2::new(16.0, -2.0),
        3 => Vec2::new(3.0, 6.0),
        2 => Vec2::new(-16.0, -2.0),
        6 => Vec2::new(-6.0, -3.0),
        1 => Vec2::new(-9.0, -3.0),
        0 => Vec2::new(-5.0, -6.0),
        _ => Vec2::new(5.0, -6.0),
    };
    position + aim.normalize_or_zero() * PLAYER_MUZZLE_OFFSET + nudge
}

/// Push a point out of every obstacle containing it, along the axis of
/// least penetration.
pub fn push_out_of_obstacles(mut p: Vec2, obstacles: &[Rect]) -> Vec2 {
    for r in obstacles {
        if !r.contains_point(p) {
            continue;
        }
        let left = p.x - r.x;
        let right = r.x + r.width - p.x;
        let below = p.y - r.y;
        let above = r.y + r.height - p.y;
        let min = left.min(right).min(below).min(above);
        if min == left {
            p.x = r.x - PLAYER_PUSH_OUT_EPSILON;
        } else if min == right {
            p.x = r.x + r.width + PLAYER_PUSH_OUT_EPSILON;
        } else if min == below {
            p.y = r.y - PLAYER_PUSH_OUT_EPSILON;
        } else {
            p.y = r.y + r.height + PLAYER_PUSH_OUT_EPSILON;
        }
    }
    p
}

/// Run the controlled agent for one tick. `controls_locked` freezes
/// movement input (cutscenes).
pub fn run(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    collision: &CollisionManager,
    pool: &mut ProjectilePool,
    events: &mut Vec<SimEvent>,
    controls_locked: bool,
    dt: f32,
) {
    let Some(entity) = find_player(world) else {
        return;
    };

    let mut shot: Option<(Vec2, Vec2)> = None;
    let mut melee_box: Option<(Rect, Vec2)> = None;

    {
        let Ok((pos, vel, combatant, control, binding)) = world.query_one_mut::<(
            &mut Position,
            &mut Velocity,
            &mut Combatant,
            &mut PlayerControl,
            &BodyBinding,
        )>(entity) else {
            return;
        };
        if combatant.dead {
            return;
        }

        let input = if controls_locked {
            Vec2::ZERO
        } else {
            control.input
        };

        if control.state.is_attacking() {
            // Input steers the aim while attacking, the agent stands still.
            if let Some(octant) = Octant::from_vector(input) {
                control.aim = input.normalize();
                combatant.facing = octant;
            }
            vel.0 = Vec2::ZERO;
        } else {
            vel.0 = input * PLAYER_MAX_SPEED;
            let magnitude = input.length();
            control.state = if magnitude > PLAYER_RUN_THRESHOLD {
                PlayerState::Run
            } else if magnitude > 0.0 {
                PlayerState::Walk
            } else {
                PlayerState::Idle
            };
            if let Some(octant) = Octant::from_vector(input) {
                control.aim = input.normalize();
                combatant.facing = octant;
            }
            if vel.0 != Vec2::ZERO {
                let moved = push_out_of_obstacles(pos.0 + vel.0 * dt, collision.rects());
                pos.0 = moved;
                if binding.live {
                    physics.set_transform(binding.handle, moved);
                }
            }
        }

        control.since_last_shot += dt;
        match control.state {
            PlayerState::Shooting => {
                control.attack_elapsed += dt;
                let cycle = PLAYER_ATTACK_FRAME_SECS * PLAYER_ATTACK_FRAMES as f32;
                if control.attack_elapsed >= cycle {
                    if control.trigger_held {
                        control.attack_elapsed -= cycle;
                        control.last_shot_frame = -1;
                    } else {
                        control.state = PlayerState::Idle;
                    }
                }
                if control.state == PlayerState::Shooting {
                    let frame = (control.attack_elapsed / PLAYER_ATTACK_FRAME_SECS) as i32;
                    if frame != control.last_shot_frame
                        && control.since_last_shot >= PLAYER_MIN_SHOT_INTERVAL_SECS
                    {
                        control.last_shot_frame = frame;
                        control.since_last_shot = 0.0;
                        shot = Some((
                            muzzle_position(pos.0, control.aim, combatant.facing),
                            control.aim * PLAYER_BULLET_SPEED,
                        ));
                    }
                }
            }
            PlayerState::MeleeAttack => {
                control.attack_elapsed += dt;
                if !control.melee_has_hit {
                    let reach = combatant.facing.unit_signs() * PLAYER_MELEE_REACH;
                    melee_box = Some((
                        combatant_bounds(pos.0, combatant.body_radius).translated(reach),
                        control.aim,
                    ));
                }
                let cycle = PLAYER_ATTACK_FRAME_SECS * PLAYER_ATTACK_FRAMES as f32;
                if control.attack_elapsed >= cycle {
                    control.state = PlayerState::Idle;
                    control.melee_has_hit = false;
                }
            }
            _ => {}
        }
    }

    if let Some((origin, velocity)) = shot {
        pool.spawn(origin, velocity, PLAYER_BULLET_DAMAGE, entity, Faction::Player);
        events.push(SimEvent::ProjectileFired {
            faction: Faction::Player,
            position: origin,
        });
    }

    if let Some((reach_box, direction)) = melee_box {
        let mut victims: Vec<(u64, Entity)> = world
            .query::<(&HostileBrain, &Position, &Combatant)>()
            .iter()
            .filter(|(_, (_, pos, c))| {
                !c.dead && combatant_bounds(pos.0, c.body_radius).overlaps(&reach_box)
            })
            .map(|(e, _)| (entity_id(e), e))
            .collect();
        victims.sort_unstable_by_key(|(id, _)| *id);

        if let Some(&(_, victim)) = victims.first() {
            let outcome =
                combat::apply_damage(world, physics, events, victim, PLAYER_MELEE_DAMAGE, direction);
            if outcome != DamageOutcome::Ignored {
                if let Ok(mut control) = world.get::<&mut PlayerControl>(entity) {
                    control.melee_has_hit = true;
                }
            }
        }
    }
}
