//! Simulation constants and tuning parameters.
//!
//! Distances are in world units (pixels of the level map), times in seconds.

/// Fixed simulation step rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Upper bound on steps run for one frame delta before the accumulator is
/// clamped, so a long stall cannot spiral.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

// --- Hostile agent ---

pub const HOSTILE_BODY_RADIUS: f32 = 38.0;
pub const HOSTILE_MAX_SPEED: f32 = 200.0;
pub const HOSTILE_HEALTH: i32 = 120;

/// Health regained per second once regen kicks in.
pub const HOSTILE_REGEN_PER_SEC: f32 = 5.0;

/// Continuous idle time before regen starts.
pub const HOSTILE_REGEN_DELAY_SECS: f32 = 2.0;

/// Entry range for `Attack`.
pub const HOSTILE_ATTACK_RANGE: f32 = 280.0;

/// Exit range for `Attack`. Larger than the entry range (hysteresis).
pub const HOSTILE_STOP_ATTACK_RANGE: f32 = 350.0;

pub const HOSTILE_CHASE_RANGE: f32 = 600.0;

/// Below this distance sight is assumed regardless of occluders.
pub const HOSTILE_POINT_BLANK_RANGE: f32 = HOSTILE_BODY_RADIUS * 4.5;

/// Distance at which the target counts as adjacent.
pub const HOSTILE_ADJACENT_RANGE: f32 = 50.0;

/// Buffer applied to obstacles for the static line-of-sight test.
pub const LOS_OBSTACLE_BUFFER: f32 = 20.0;

/// Nudge applied to both ray endpoints so the cast starts outside the shooter.
pub const LOS_RAY_NUDGE: f32 = 0.1;

pub const HOSTILE_AVOIDANCE_RADIUS: f32 = HOSTILE_BODY_RADIUS + 50.0;

/// Weight of the obstacle-avoidance vector in the steering sum.
pub const HOSTILE_AVOIDANCE_WEIGHT: f32 = 0.5;

pub const HOSTILE_SEPARATION_RADIUS: f32 = HOSTILE_BODY_RADIUS * 3.5;
pub const HOSTILE_SEPARATION_GAIN: f32 = 0.6;

pub const HOSTILE_STACKING_RADIUS: f32 = HOSTILE_BODY_RADIUS * 2.5;
pub const HOSTILE_STACKING_GAIN: f32 = 0.3;
pub const HOSTILE_STACKING_MAX: f32 = 0.5;

/// Arrival tolerance when seeking the last known target position.
pub const HOSTILE_ARRIVAL_DISTANCE: f32 = 10.0;

pub const HOSTILE_WANDER_MIN: f32 = 50.0;
pub const HOSTILE_WANDER_MAX: f32 = 200.0;
pub const HOSTILE_WANDER_SPEED_FACTOR: f32 = 0.2;
pub const HOSTILE_WANDER_RETARGET_SECS: f32 = 1.5;

pub const HOSTILE_ATTACK_FRAME_SECS: f32 = 0.08;
pub const HOSTILE_ATTACK_FRAMES: u32 = 8;

pub const HOSTILE_BULLET_SPEED: f32 = 700.0;
pub const HOSTILE_BULLET_DAMAGE: i32 = 3;

/// Grace period between death and removal from the scene.
pub const DEATH_REMOVAL_SECS: f32 = 0.5;

// --- Controlled agent ---

pub const PLAYER_BODY_RADIUS: f32 = 38.0;
pub const PLAYER_MAX_SPEED: f32 = 200.0;
pub const PLAYER_HEALTH: i32 = 1000;

/// Input magnitude above which the agent runs instead of walks.
pub const PLAYER_RUN_THRESHOLD: f32 = 0.85;

pub const PLAYER_ATTACK_FRAME_SECS: f32 = 0.13;
pub const PLAYER_ATTACK_FRAMES: u32 = 8;
pub const PLAYER_MIN_SHOT_INTERVAL_SECS: f32 = 0.1;
pub const PLAYER_BULLET_SPEED: f32 = 1000.0;
pub const PLAYER_BULLET_DAMAGE: i32 = 20;

/// Distance from the agent centre to the muzzle along the aim direction.
pub const PLAYER_MUZZLE_OFFSET: f32 = 15.0;

pub const PLAYER_MELEE_DAMAGE: i32 = 100;

/// How far the melee box is projected in the facing direction.
pub const PLAYER_MELEE_REACH: f32 = 10.0;

/// Nudge applied past an obstacle edge when pushing the agent out.
pub const PLAYER_PUSH_OUT_EPSILON: f32 = 0.01;

// --- Obstacles ---

/// Expansion applied to the left edge of map-authored obstacles.
pub const MAP_OBSTACLE_EXPANSION: f32 = 5.0;

/// Margin added on every side of obstacles registered at runtime.
pub const DYNAMIC_OBSTACLE_MARGIN: f32 = 1.0;

// --- Projectiles ---

pub const PROJECTILE_SIZE: f32 = 8.0;

// --- Waves ---

pub const DEFAULT_WAVE_TABLE: [u32; 7] = [5, 4, 1, 2, 1, 4, 5];
pub const WAVE_INTERVAL_SECS: f32 = 10.0;
/// Footprint of a wave vehicle.
pub const VEHICLE_SIZE: (f32, f32) = (90.0, 180.0);
pub const VEHICLE_ARRIVAL_SECS: f32 = 2.0;
pub const VEHICLE_SETTLE_SECS: f32 = 0.1;
pub const VEHICLE_LINGER_SECS: f32 = 0.5;
pub const VEHICLE_CONTACT_DAMAGE: i32 = 1000;
pub const VEHICLE_CONTACT_COOLDOWN_SECS: f32 = 0.5;

pub const SPAWN_RING_GAP: f32 = 40.0;
pub const SPAWN_RING_DECAY: f32 = 0.9;
pub const SPAWN_RING_ATTEMPTS: u32 = 50;
pub const SPAWN_LATERAL_OFFSET: f32 = 10.0;
pub const SPAWN_JITTER: i32 = 20;
pub const SPAWN_CLEARANCE: f32 = 20.0;
pub const SPAWN_MIN_SPACING: f32 = 30.0;
pub const SPAWN_EDGE_MARGIN: f32 = 20.0;
pub const SPAWN_FALLBACK_ATTEMPTS: u32 = 50;

// --- Cutscenes ---

pub const CUTSCENE_BODY_RADIUS: f32 = 48.0;
pub const CUTSCENE_APPROACH_SPEED: f32 = 150.0;
pub const CUTSCENE_DIALOG_DISTANCE: f32 = 100.0;
pub const CUTSCENE_DEPART_SPEED: f32 = 100.0;

pub const INTRO_LINES: [&str; 2] = ["Welcome to the training ground.", "Good luck."];
pub const OUTRO_LINES: [&str; 2] = ["You are the last one standing.", "Impressive skills."];

// --- Mission ---

/// Padding around the cutscene zone searched for the agent's spawn point.
pub const PLAYER_SPAWN_PADDING: f32 = 100.0;
pub const PLAYER_SPAWN_ATTEMPTS: u32 = 10;
pub const PLAYER_SPAWN_FALLBACK: (f32, f32) = (100.0, 100.0);
