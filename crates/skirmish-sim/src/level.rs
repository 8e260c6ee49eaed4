//! Level geometry: named layers of rectangles.
//!
//! Levels are authored as JSON documents with a map size and a set of named
//! layers. The simulation reads them through `LevelSource`, so a different
//! map format only needs its own implementation of that trait.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use skirmish_core::error::LevelError;
use skirmish_core::types::Rect;

/// Static obstacles.
pub const LAYER_COLLISIONS: &str = "Collisions";
/// Points where wave vehicles park. Usually zero-size point objects.
pub const LAYER_CAR_SPAWN_POINTS: &str = "CarSpawnPoints";
/// Parked vehicles that are permanent obstacles.
pub const LAYER_CAR_STATIC_POINTS: &str = "CarStaticPoints";
/// Area that triggers the intro cutscene.
pub const LAYER_CUTSCENE_ZONE: &str = "CutsceneZone";

/// Cutscene zone used when the level does not author one.
pub const DEFAULT_CUTSCENE_ZONE: Rect = Rect::new(600.0, 300.0, 250.0, 250.0);

/// Read access to level geometry.
pub trait LevelSource: Send {
    /// Map width and height.
    fn size(&self) -> Vec2;

    /// Rectangles of the named layer, empty if the layer is absent.
    fn layer(&self, name: &str) -> &[Rect];

    fn cutscene_zone(&self) -> Rect {
        self.layer(LAYER_CUTSCENE_ZONE)
            .first()
            .copied()
            .unwrap_or(DEFAULT_CUTSCENE_ZONE)
    }
}

/// Level document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelMap {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub layers: BTreeMap<String, Vec<Rect>>,
}

impl LevelMap {
    /// Parse and validate a level document.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelMap = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !self.layers.contains_key(LAYER_COLLISIONS) {
            return Err(LevelError::MissingLayer(LAYER_COLLISIONS.into()));
        }
        if self.layer(LAYER_CAR_SPAWN_POINTS).is_empty() {
            return Err(LevelError::MissingLayer(LAYER_CAR_SPAWN_POINTS.into()));
        }
        Ok(())
    }

    /// Built-in 1600 x 1200 yard with border walls, a few crates, three
    /// vehicle bays near the top edge and one parked vehicle.
    pub fn demo() -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(
            LAYER_COLLISIONS.to_string(),
            vec![
                // Border walls
                Rect::new(0.0, 0.0, 1600.0, 20.0),
                Rect::new(0.0, 1180.0, 1600.0, 20.0),
                Rect::new(0.0, 0.0, 20.0, 1200.0),
                Rect::new(1580.0, 0.0, 20.0, 1200.0),
                // Crates
                Rect::new(400.0, 500.0, 80.0, 80.0),
                Rect::new(1000.0, 450.0, 120.0, 60.0),
                Rect::new(1300.0, 250.0, 80.0, 160.0),
            ],
        );
        layers.insert(
            LAYER_CAR_SPAWN_POINTS.to_string(),
            vec![
                Rect::new(260.0, 950.0, 0.0, 0.0),
                Rect::new(800.0, 980.0, 0.0, 0.0),
                Rect::new(1310.0, 950.0, 0.0, 0.0),
            ],
        );
        layers.insert(
            LAYER_CAR_STATIC_POINTS.to_string(),
            vec![Rect::new(120.0, 150.0, 120.0, 200.0)],
        );
        layers.insert(LAYER_CUTSCENE_ZONE.to_string(), vec![DEFAULT_CUTSCENE_ZONE]);
        Self {
            width: 1600.0,
            height: 1200.0,
            layers,
        }
    }
}

impl LevelSource for LevelMap {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn layer(&self, name: &str) -> &[Rect] {
        self.layers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
