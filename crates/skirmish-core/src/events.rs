//! Events emitted by the simulation for hosts, audio and UI feedback.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Something that happened during a tick. Drained into each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    PhaseChanged { phase: GamePhase },
    HostileSpawned { id: u64, position: Vec2, wave: u32 },
    /// Damage landed on a combatant.
    CombatantHit {
        id: u64,
        faction: Faction,
        amount: i32,
        direction: Vec2,
        remaining: i32,
    },
    HostileDied { id: u64, position: Vec2, wave: Option<u32> },
    PlayerDied { position: Vec2 },
    ProjectileFired { faction: Faction, position: Vec2 },
    WaveDispatched { wave: u32, hostiles: u32 },
    DoorsOpened { wave: u32, obstacle_registered: bool },
    AllWavesComplete,
    DialogLine { cutscene: CutsceneKind, line: usize },
    DialogComplete { cutscene: CutsceneKind },
    CutsceneFinished { cutscene: CutsceneKind },
    MissionComplete,
}
