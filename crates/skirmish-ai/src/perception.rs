//! Perception helpers: distance, line-of-sight combination and obstacle
//! occlusion tests.

use glam::Vec2;

use skirmish_core::constants::LOS_RAY_NUDGE;
use skirmish_core::types::Rect;

use crate::profiles::HostileProfile;

/// Raw inputs for one sight check.
#[derive(Debug, Clone, Copy)]
pub struct SightReport {
    pub distance: f32,
    /// The physics ray cast reported a blocking hit.
    pub ray_blocked: bool,
    /// The static obstacle test reported a blocking rectangle.
    pub obstacle_blocked: bool,
}

/// Combine the two occlusion tests. Either one blocks sight, unless the
/// target is inside point-blank range.
pub fn resolve_sight(report: &SightReport, profile: &HostileProfile) -> bool {
    if report.distance < profile.point_blank_range {
        return true;
    }
    !report.ray_blocked && !report.obstacle_blocked
}

/// Whether the target is close enough to count as adjacent.
pub fn is_adjacent(distance: f32, profile: &HostileProfile) -> bool {
    distance < profile.adjacent_range
}

/// Endpoints for the sight ray, nudged so it starts and ends just off the
/// two bodies' centres.
pub fn ray_endpoints(from: Vec2, to: Vec2) -> (Vec2, Vec2) {
    let nudge = Vec2::splat(LOS_RAY_NUDGE);
    (from + nudge, to - nudge)
}

/// True if the segment `a -> b` is occluded by any obstacle. A rectangle
/// occludes when the segment crosses it and also crosses the rectangle grown
/// by `buffer`.
pub fn segment_blocked(rects: &[Rect], a: Vec2, b: Vec2, buffer: f32) -> bool {
    rects
        .iter()
        .any(|r| r.intersects_segment(a, b) && r.expanded(buffer).intersects_segment(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(distance: f32, ray_blocked: bool, obstacle_blocked: bool) -> SightReport {
        SightReport {
            distance,
            ray_blocked,
            obstacle_blocked,
        }
    }

    #[test]
    fn test_either_occluder_blocks() {
        let p = HostileProfile::default();
        assert!(resolve_sight(&report(300.0, false, false), &p));
        assert!(!resolve_sight(&report(300.0, true, false), &p));
        assert!(!resolve_sight(&report(300.0, false, true), &p));
    }

    #[test]
    fn test_point_blank_overrides_occlusion() {
        let p = HostileProfile::default();
        assert!(resolve_sight(&report(0.0, true, true), &p));
        assert!(resolve_sight(&report(p.point_blank_range - 1.0, true, true), &p));
        assert!(!resolve_sight(&report(p.point_blank_range, true, true), &p));
    }

    #[test]
    fn test_segment_blocked_by_wall() {
        let wall = [Rect::new(100.0, -50.0, 20.0, 100.0)];
        assert!(segment_blocked(&wall, Vec2::ZERO, Vec2::new(300.0, 0.0), 20.0));
        assert!(!segment_blocked(&wall, Vec2::ZERO, Vec2::new(90.0, 0.0), 20.0));
        // Passing the wall's end within the buffer is not a block on its own.
        assert!(!segment_blocked(&wall, Vec2::new(0.0, 60.0), Vec2::new(300.0, 60.0), 20.0));
    }

    #[test]
    fn test_ray_endpoints_nudged() {
        let (a, b) = ray_endpoints(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(a, Vec2::splat(0.1));
        assert_eq!(b, Vec2::splat(9.9));
    }
}
