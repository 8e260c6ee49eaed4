//! Steering behaviors: seek, obstacle avoidance, neighbor separation and
//! wander. Every function returns a vector and never mutates its inputs.

use glam::Vec2;
use rand::Rng;

use skirmish_core::types::Rect;

use crate::profiles::HostileProfile;

/// Distance below which two agents are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// A nearby same-faction agent. `key` must be unique and stable per agent.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub key: u64,
    pub position: Vec2,
}

/// Unit vector from `from` toward `to`, or zero if they coincide.
pub fn seek(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Repulsion from obstacles within `radius` of `pos`, measured to each
/// obstacle's nearest point. Strength falls off linearly with distance.
pub fn obstacle_avoidance(pos: Vec2, obstacles: &[Rect], radius: f32) -> Vec2 {
    let mut force = Vec2::ZERO;
    for rect in obstacles {
        let distance = rect.distance_to_point(pos);
        if distance < radius {
            let away = (pos - rect.center()).normalize_or_zero();
            force += away * ((radius - distance) / radius);
        }
    }
    force
}

/// Direction used to split two agents standing on the same point.
///
/// Both agents of a pair derive the same base angle from their keys and
/// take opposite signs, so they push apart instead of drifting together.
pub fn tiebreak_direction(self_key: u64, other_key: u64) -> Vec2 {
    let (lo, hi) = if self_key < other_key {
        (self_key, other_key)
    } else {
        (other_key, self_key)
    };
    let mixed = lo
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .rotate_left(17)
        ^ hi.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    let degrees = (mixed % 360) as f32;
    let base = Vec2::from_angle(degrees.to_radians());
    if self_key < other_key {
        base
    } else {
        -base
    }
}

fn away_from(self_key: u64, pos: Vec2, other: &Neighbor) -> (Vec2, f32) {
    let delta = pos - other.position;
    let distance = delta.length();
    if distance > COINCIDENT_EPSILON {
        (delta / distance, distance)
    } else {
        (tiebreak_direction(self_key, other.key), 0.0)
    }
}

/// Separation from neighbors inside `radius`, linear in penetration.
pub fn neighbor_repulsion(
    self_key: u64,
    pos: Vec2,
    neighbors: &[Neighbor],
    radius: f32,
    gain: f32,
) -> Vec2 {
    let mut force = Vec2::ZERO;
    for other in neighbors.iter().filter(|n| n.key != self_key) {
        let (dir, distance) = away_from(self_key, pos, other);
        if distance < radius {
            force += dir * (radius - distance) * gain;
        }
    }
    force
}

/// Short-range anti-stacking push with a capped per-neighbor strength.
pub fn stacking_separation(
    self_key: u64,
    pos: Vec2,
    neighbors: &[Neighbor],
    profile: &HostileProfile,
) -> Vec2 {
    let mut impulse = Vec2::ZERO;
    for other in neighbors.iter().filter(|n| n.key != self_key) {
        let (dir, distance) = away_from(self_key, pos, other);
        if distance < profile.stacking_radius {
            let strength = ((profile.stacking_radius - distance) * profile.stacking_gain)
                .clamp(0.0, profile.stacking_max);
            impulse += dir * strength;
        }
    }
    impulse
}

/// Weighted steering sum scaled to `max_speed`. `avoidance` is the sum of
/// obstacle avoidance and neighbor repulsion.
pub fn desired_velocity(seek_dir: Vec2, avoidance: Vec2, profile: &HostileProfile) -> Vec2 {
    (seek_dir + avoidance * profile.avoidance_weight).normalize_or_zero() * profile.max_speed
}

/// Random point between `wander_min` and `wander_max` away from `pos`.
pub fn pick_wander_target<R: Rng>(pos: Vec2, rng: &mut R, profile: &HostileProfile) -> Vec2 {
    let distance = rng.gen_range(profile.wander_min..=profile.wander_max);
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    pos + Vec2::from_angle(angle) * distance
}

/// Velocity toward a wander target at the reduced wander speed.
pub fn wander_velocity(pos: Vec2, target: Vec2, profile: &HostileProfile) -> Vec2 {
    seek(pos, target) * profile.max_speed * profile.wander_speed_factor
}
