//! Hostile tuning profiles.

use serde::{Deserialize, Serialize};

use skirmish_core::constants::*;

/// Tuning knobs for hostile behavior. Defaults match the built-in hostile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileProfile {
    pub body_radius: f32,
    pub max_speed: f32,
    pub health: i32,
    pub regen_per_sec: f32,
    pub regen_delay_secs: f32,
    pub attack_range: f32,
    /// Must exceed `attack_range`.
    pub stop_attack_range: f32,
    pub chase_range: f32,
    pub point_blank_range: f32,
    pub adjacent_range: f32,
    pub avoidance_radius: f32,
    pub avoidance_weight: f32,
    pub separation_radius: f32,
    pub separation_gain: f32,
    pub stacking_radius: f32,
    pub stacking_gain: f32,
    pub stacking_max: f32,
    pub arrival_distance: f32,
    pub wander_min: f32,
    pub wander_max: f32,
    pub wander_speed_factor: f32,
    pub wander_retarget_secs: f32,
    pub attack_frame_secs: f32,
    pub attack_frames: u32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
}

impl Default for HostileProfile {
    fn default() -> Self {
        Self {
            body_radius: HOSTILE_BODY_RADIUS,
            max_speed: HOSTILE_MAX_SPEED,
            health: HOSTILE_HEALTH,
            regen_per_sec: HOSTILE_REGEN_PER_SEC,
            regen_delay_secs: HOSTILE_REGEN_DELAY_SECS,
            attack_range: HOSTILE_ATTACK_RANGE,
            stop_attack_range: HOSTILE_STOP_ATTACK_RANGE,
            chase_range: HOSTILE_CHASE_RANGE,
            point_blank_range: HOSTILE_POINT_BLANK_RANGE,
            adjacent_range: HOSTILE_ADJACENT_RANGE,
            avoidance_radius: HOSTILE_AVOIDANCE_RADIUS,
            avoidance_weight: HOSTILE_AVOIDANCE_WEIGHT,
            separation_radius: HOSTILE_SEPARATION_RADIUS,
            separation_gain: HOSTILE_SEPARATION_GAIN,
            stacking_radius: HOSTILE_STACKING_RADIUS,
            stacking_gain: HOSTILE_STACKING_GAIN,
            stacking_max: HOSTILE_STACKING_MAX,
            arrival_distance: HOSTILE_ARRIVAL_DISTANCE,
            wander_min: HOSTILE_WANDER_MIN,
            wander_max: HOSTILE_WANDER_MAX,
            wander_speed_factor: HOSTILE_WANDER_SPEED_FACTOR,
            wander_retarget_secs: HOSTILE_WANDER_RETARGET_SECS,
            attack_frame_secs: HOSTILE_ATTACK_FRAME_SECS,
            attack_frames: HOSTILE_ATTACK_FRAMES,
            bullet_speed: HOSTILE_BULLET_SPEED,
            bullet_damage: HOSTILE_BULLET_DAMAGE,
        }
    }
}

impl HostileProfile {
    /// Length of one full attack animation cycle.
    pub fn attack_cycle_secs(&self) -> f32 {
        self.attack_frame_secs * self.attack_frames as f32
    }

    /// Profile values that would break the state machine.
    pub fn validate(&self) -> Result<(), String> {
        if self.stop_attack_range <= self.attack_range {
            return Err(format!(
                "stop_attack_range ({}) must exceed attack_range ({})",
                self.stop_attack_range, self.attack_range
            ));
        }
        if self.attack_frames == 0 || self.attack_frame_secs <= 0.0 {
            return Err("attack animation must have a positive length".into());
        }
        if self.max_speed < 0.0 || self.health <= 0 {
            return Err("max_speed and health must be positive".into());
        }
        Ok(())
    }
}
