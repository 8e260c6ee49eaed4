//! Damage application and death sequencing shared by every damage source.

use glam::Vec2;
use hecs::{Entity, World};
use log::{debug, warn};

use skirmish_core::components::*;
use skirmish_core::constants::DEATH_REMOVAL_SECS;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;

use crate::physics::PhysicsWorld;
use crate::world_setup::entity_id;

/// Result of one damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was already dead or is not a combatant.
    Ignored,
    Wounded,
    /// This hit crossed zero health.
    Killed,
}

/// Apply `amount` damage to `target` along `direction`.
///
/// Health clamps at zero. The hit that takes health to zero runs the death
/// sequence; every later hit on the same target is ignored.
pub fn apply_damage(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    events: &mut Vec<SimEvent>,
    target: Entity,
    amount: i32,
    direction: Vec2,
) -> DamageOutcome {
    let (faction, remaining) = {
        let Ok((combatant, health)) = world.query_one_mut::<(&mut Combatant, &mut Health)>(target)
        else {
            return DamageOutcome::Ignored;
        };
        if combatant.dead {
            return DamageOutcome::Ignored;
        }
        health.current = (health.current - amount.max(0)).clamp(0, health.max);
        if health.current == 0 {
            combatant.dead = true;
        }
        (combatant.faction, health.current)
    };

    events.push(SimEvent::CombatantHit {
        id: entity_id(target),
        faction,
        amount,
        direction,
        remaining,
    });

    if remaining > 0 {
        return DamageOutcome::Wounded;
    }
    kill(world, physics, events, target, faction);
    DamageOutcome::Killed
}

/// Death sequence: freeze, tear down the body, notify, schedule removal.
fn kill(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    events: &mut Vec<SimEvent>,
    target: Entity,
    faction: Faction,
) {
    if let Ok(mut velocity) = world.get::<&mut Velocity>(target) {
        velocity.0 = Vec2::ZERO;
    }
    release_body(world, physics, target);

    let position = world
        .get::<&Position>(target)
        .map(|p| p.0)
        .unwrap_or_default();

    match faction {
        Faction::Hostile => {
            if let Ok(mut brain) = world.get::<&mut HostileBrain>(target) {
                brain.state = HostileState::Death;
                brain.moving = false;
            }
            let wave = world.get::<&WaveMember>(target).ok().map(|m| m.wave);
            if let Err(err) = world.insert_one(
                target,
                DeathTimer {
                    remaining_secs: DEATH_REMOVAL_SECS,
                },
            ) {
                debug!("Death timer for {}: {err}", entity_id(target));
            }
            debug!("Hostile {} died at {}", entity_id(target), position);
            events.push(SimEvent::HostileDied {
                id: entity_id(target),
                position,
                wave,
            });
        }
        Faction::Player => {
            if let Ok(mut control) = world.get::<&mut PlayerControl>(target) {
                control.state = PlayerState::Death;
                control.trigger_held = false;
                control.input = Vec2::ZERO;
            }
            debug!("Player died at {}", position);
            events.push(SimEvent::PlayerDied { position });
        }
    }
}

/// Destroy the entity's physics body once. Later calls are no-ops.
pub fn release_body(world: &mut World, physics: &mut dyn PhysicsWorld, entity: Entity) {
    let Ok(mut binding) = world.get::<&mut BodyBinding>(entity) else {
        return;
    };
    if !binding.live {
        return;
    }
    binding.live = false;
    if let Err(err) = physics.destroy_body(binding.handle) {
        warn!("Body release for {}: {err}", entity_id(entity));
    }
}
