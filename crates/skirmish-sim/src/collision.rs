//! Static obstacle set.
//!
//! `CollisionManager` owns every obstacle rectangle: the level-authored
//! baseline plus obstacles registered at runtime (vehicle footprints). The
//! storage sits behind `ObstacleIndex` so a spatial index can replace the
//! linear scan without touching callers.

use glam::Vec2;
use log::debug;

use skirmish_core::constants::{DYNAMIC_OBSTACLE_MARGIN, MAP_OBSTACLE_EXPANSION};
use skirmish_core::types::Rect;

use skirmish_ai::perception;

use crate::level::{LevelSource, LAYER_CAR_STATIC_POINTS, LAYER_COLLISIONS};

/// Storage and queries for obstacle rectangles.
pub trait ObstacleIndex: Default + Send {
    fn insert(&mut self, rect: Rect);
    fn clear(&mut self);
    /// All rectangles in insertion order.
    fn rects(&self) -> &[Rect];

    fn len(&self) -> usize {
        self.rects().len()
    }

    fn is_empty(&self) -> bool {
        self.rects().is_empty()
    }

    fn overlaps(&self, rect: &Rect) -> bool {
        self.rects().iter().any(|r| r.overlaps(rect))
    }

    fn contains_point(&self, p: Vec2) -> bool {
        self.rects().iter().any(|r| r.contains_point(p))
    }
}

/// Flat vector with O(n) queries.
#[derive(Debug, Clone, Default)]
pub struct LinearObstacles {
    rects: Vec<Rect>,
}

impl ObstacleIndex for LinearObstacles {
    fn insert(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    fn clear(&mut self) {
        self.rects.clear();
    }

    fn rects(&self) -> &[Rect] {
        &self.rects
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollisionManager<I: ObstacleIndex = LinearObstacles> {
    index: I,
    /// Level-authored obstacles, already expanded.
    baseline: Vec<Rect>,
}

impl<I: ObstacleIndex> CollisionManager<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the baseline with the level's obstacles and rebuild.
    ///
    /// `Collisions` rectangles get the map expansion on their left edge,
    /// parked vehicles get the runtime margin.
    pub fn load_level(&mut self, level: &dyn LevelSource) {
        self.baseline.clear();
        for rect in level.layer(LAYER_COLLISIONS) {
            self.baseline.push(expand_map_rect(rect));
        }
        for rect in level.layer(LAYER_CAR_STATIC_POINTS) {
            self.baseline.push(rect.expanded(DYNAMIC_OBSTACLE_MARGIN));
        }
        self.rebuild_from_source();
        debug!("Loaded {} level obstacles", self.baseline.len());
    }

    /// Register a runtime obstacle, grown by the dynamic margin.
    pub fn add_obstacle(&mut self, rect: Rect) {
        self.index.insert(rect.expanded(DYNAMIC_OBSTACLE_MARGIN));
    }

    /// Register a map-authored obstacle with the map expansion applied.
    pub fn add_map_obstacle(&mut self, rect: Rect) {
        self.index.insert(expand_map_rect(&rect));
    }

    pub fn query_overlaps(&self, rect: &Rect) -> bool {
        self.index.overlaps(rect)
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.index.contains_point(p)
    }

    /// Line-of-sight occlusion test against every obstacle.
    pub fn segment_blocked(&self, a: Vec2, b: Vec2, buffer: f32) -> bool {
        perception::segment_blocked(self.index.rects(), a, b, buffer)
    }

    pub fn rects(&self) -> &[Rect] {
        self.index.rects()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Restore the obstacle set to the level-authored baseline.
    pub fn rebuild_from_source(&mut self) {
        self.index.clear();
        for rect in &self.baseline {
            self.index.insert(*rect);
        }
    }
}

fn expand_map_rect(rect: &Rect) -> Rect {
    Rect::new(
        rect.x - MAP_OBSTACLE_EXPANSION,
        rect.y,
        rect.width + MAP_OBSTACLE_EXPANSION,
        rect.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelMap;

    #[test]
    fn test_add_obstacle_applies_margin() {
        let mut cm: CollisionManager = CollisionManager::new();
        cm.add_obstacle(Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(cm.rects()[0], Rect::new(9.0, 9.0, 12.0, 12.0));
        assert!(cm.contains_point(Vec2::new(9.0, 9.0)));
        assert!(cm.query_overlaps(&Rect::new(20.5, 15.0, 5.0, 5.0)));
    }

    #[test]
    fn test_map_obstacle_expands_left_edge() {
        let mut cm: CollisionManager = CollisionManager::new();
        cm.add_map_obstacle(Rect::new(100.0, 100.0, 50.0, 20.0));
        assert_eq!(cm.rects()[0], Rect::new(95.0, 100.0, 55.0, 20.0));
    }

    #[test]
    fn test_rebuild_restores_baseline() {
        let level = LevelMap::demo();
        let mut cm: CollisionManager = CollisionManager::new();
        cm.load_level(&level);
        let baseline = cm.rects().to_vec();
        assert_eq!(baseline.len(), 8);

        cm.add_obstacle(Rect::new(700.0, 700.0, 10.0, 10.0));
        assert_eq!(cm.len(), 9);

        cm.clear();
        assert!(cm.is_empty());
        cm.rebuild_from_source();
        assert_eq!(cm.rects(), baseline.as_slice());
        cm.rebuild_from_source();
        assert_eq!(cm.rects(), baseline.as_slice());
    }

    #[test]
    fn test_segment_blocked_by_crate() {
        let mut cm: CollisionManager = CollisionManager::new();
        cm.add_map_obstacle(Rect::new(400.0, 500.0, 80.0, 80.0));
        assert!(cm.segment_blocked(Vec2::new(300.0, 540.0), Vec2::new(600.0, 540.0), 20.0));
        assert!(!cm.segment_blocked(Vec2::new(300.0, 700.0), Vec2::new(600.0, 700.0), 20.0));
    }
}
