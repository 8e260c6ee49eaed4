//! Game state snapshot, the read-only view handed to hosts after each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::SimTime;

/// Complete picture of the simulation after a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub paused: bool,
    pub player: Option<PlayerView>,
    pub hostiles: Vec<HostileView>,
    pub projectiles: Vec<ProjectileView>,
    pub vehicles: Vec<VehicleView>,
    pub cutscene: Option<CutsceneView>,
    pub waves: WaveView,
    pub obstacle_count: usize,
    pub pool_capacity: usize,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub state: PlayerState,
    pub weapon: WeaponMode,
    pub facing: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileView {
    pub id: u64,
    pub position: Vec2,
    pub health: i32,
    pub state: HostileState,
    pub facing: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Vec2,
    pub velocity: Vec2,
    pub faction: Faction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleView {
    pub position: Vec2,
    pub size: Vec2,
    pub doors_open: bool,
    pub collision_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutsceneView {
    pub kind: CutsceneKind,
    pub stage: CutsceneStage,
    pub position: Vec2,
    pub facing: u8,
    /// Dialog line currently shown, if any.
    pub line: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveView {
    pub current_wave: u32,
    pub total_waves: u32,
    pub active_hostiles: u32,
    pub complete: bool,
}
