//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{BodyHandle, Rect};

/// World-space centre of an entity. Mirrors the physics body transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Velocity in units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Hit points. `current` stays within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

/// Shared combat data for the controlled agent and hostiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub faction: Faction,
    /// Half-extent of the square used for hit tests and obstacle checks.
    pub body_radius: f32,
    pub facing: Octant,
    /// Set exactly once, when health first reaches zero.
    pub dead: bool,
}

/// Binding between an entity and its physics body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyBinding {
    pub handle: BodyHandle,
    /// False once the body has been destroyed.
    pub live: bool,
}

/// Hostile behavior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileBrain {
    pub state: HostileState,
    /// Refreshed on every successful sight check.
    pub last_known_target: Option<Vec2>,
    /// Continuous seconds spent in `Idle`.
    pub idle_secs: f32,
    /// Fractional regen not yet applied to integer health.
    pub regen_carry: f32,
    /// Seconds into the current attack animation cycle.
    pub attack_elapsed: f32,
    /// Last attack frame that fired, -1 at the start of a cycle.
    pub last_attack_frame: i32,
    pub wander_target: Option<Vec2>,
    pub wander_timer: f32,
    /// Whether the hostile moved during the last tick.
    pub moving: bool,
}

impl Default for HostileBrain {
    fn default() -> Self {
        Self {
            state: HostileState::Idle,
            last_known_target: None,
            idle_secs: 0.0,
            regen_carry: 0.0,
            attack_elapsed: 0.0,
            last_attack_frame: -1,
            wander_target: None,
            wander_timer: 0.0,
            moving: false,
        }
    }
}

/// Input-driven state of the controlled agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerControl {
    pub state: PlayerState,
    pub weapon: WeaponMode,
    /// Latest movement input, length at most 1.
    pub input: Vec2,
    /// Unit aim direction.
    pub aim: Vec2,
    pub trigger_held: bool,
    /// Seconds into the current attack animation cycle.
    pub attack_elapsed: f32,
    pub last_shot_frame: i32,
    pub since_last_shot: f32,
    /// Latched when a melee swing connects, cleared when the swing ends.
    pub melee_has_hit: bool,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self {
            state: PlayerState::Idle,
            weapon: WeaponMode::Unarmed,
            input: Vec2::ZERO,
            aim: Vec2::X,
            trigger_held: false,
            attack_elapsed: 0.0,
            last_shot_frame: -1,
            since_last_shot: f32::MAX,
            melee_has_hit: false,
        }
    }
}

/// Countdown to removal of a dead entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeathTimer {
    pub remaining_secs: f32,
}

/// Marks a hostile spawned by the wave scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveMember {
    pub wave: u32,
}

/// Transient vehicle that delivers a wave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub size: Vec2,
    /// Footprint registered as an obstacle when the doors open.
    pub spawn_rect: Rect,
    pub hostiles: u32,
    pub wave: u32,
    pub doors_open: bool,
    pub collision_active: bool,
    pub contact_cooldown: f32,
}

/// Linear move in progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearMotion {
    pub from: Vec2,
    pub to: Vec2,
    pub duration_secs: f32,
    pub elapsed_secs: f32,
}

/// Scripted dialog actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutsceneActor {
    pub kind: CutsceneKind,
    pub stage: CutsceneStage,
    pub line: usize,
    pub facing: Octant,
    /// Set by `AdvanceDialog`, consumed on the next tick.
    pub advance_requested: bool,
}
