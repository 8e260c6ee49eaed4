//! Player commands sent from the host to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Agent control ---
    /// Joystick vector. Clamped to unit length.
    Move { x: f32, y: f32 },
    AttackPressed,
    AttackReleased,
    SwitchWeapon { weapon: WeaponMode },

    // --- Cutscenes ---
    /// Show the next dialog line.
    AdvanceDialog,

    // --- Simulation control ---
    StartMission,
    /// Tear the mission down and start it again from the beginning.
    RestartMission,
    Pause,
    Resume,
    /// Set time scale (1.0 = normal). Clamped to `[0, 4]`.
    SetTimeScale { scale: f32 },
}
