//! Enumeration types used throughout the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which side a combatant or projectile fights for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The controlled agent.
    #[default]
    Player,
    Hostile,
}

/// Stable role tag carried by every scene entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Player,
    Hostile,
    Vehicle,
    Scripted,
}

/// Hostile agent behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileState {
    #[default]
    Idle,
    Walk,
    Attack,
    /// Terminal.
    Death,
}

/// Controlled agent state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Walk,
    Run,
    Shooting,
    MeleeAttack,
    /// Terminal.
    Death,
}

impl PlayerState {
    pub fn is_attacking(self) -> bool {
        matches!(self, PlayerState::Shooting | PlayerState::MeleeAttack)
    }
}

/// Weapon selected by the controlled agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponMode {
    #[default]
    Unarmed,
    Ranged,
    Melee,
}

/// Mission flow phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `StartMission`.
    #[default]
    Ready,
    /// Agent roams the level before the intro cutscene.
    Exploring,
    CutsceneStart,
    /// Waves are running.
    Combat,
    CutsceneEnd,
    GameOver,
    MissionComplete,
}

/// Which scripted sequence a cutscene actor is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutsceneKind {
    Intro,
    Outro,
}

/// Scripted actor progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutsceneStage {
    #[default]
    Approaching,
    Dialog,
    Departing,
    Done,
}

/// One of eight compass directions, counter-clockwise from +x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Octant {
    #[default]
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::Right,
        Octant::UpRight,
        Octant::Up,
        Octant::UpLeft,
        Octant::Left,
        Octant::DownLeft,
        Octant::Down,
        Octant::DownRight,
    ];

    /// Quantize a direction. Sector boundaries sit at 22.5° + k·45°, lower
    /// bound inclusive, so 0° maps to `Right`. Returns `None` for a zero or
    /// non-finite vector.
    pub fn from_vector(v: Vec2) -> Option<Octant> {
        if !v.is_finite() || v == Vec2::ZERO {
            return None;
        }
        let degrees = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
        let sector = ((degrees + 22.5) / 45.0).floor() as usize % 8;
        Some(Self::ALL[sector])
    }

    /// Per-axis sign of the direction (-1, 0 or 1 on each axis).
    pub fn unit_signs(self) -> Vec2 {
        match self {
            Octant::Right => Vec2::new(1.0, 0.0),
            Octant::UpRight => Vec2::new(1.0, 1.0),
            Octant::Up => Vec2::new(0.0, 1.0),
            Octant::UpLeft => Vec2::new(-1.0, 1.0),
            Octant::Left => Vec2::new(-1.0, 0.0),
            Octant::DownLeft => Vec2::new(-1.0, -1.0),
            Octant::Down => Vec2::new(0.0, -1.0),
            Octant::DownRight => Vec2::new(1.0, -1.0),
        }
    }

    /// Normalized direction vector.
    pub fn direction(self) -> Vec2 {
        self.unit_signs().normalize()
    }

    /// Sprite row used by the controlled agent's animation sheets.
    pub fn player_index(self) -> u8 {
        match self {
            Octant::Down => 0,
            Octant::DownLeft => 1,
            Octant::UpLeft => 2,
            Octant::Up => 3,
            Octant::UpRight => 4,
            Octant::DownRight => 5,
            Octant::Left => 6,
            Octant::Right => 7,
        }
    }

    /// Sprite row used by hostile animation sheets. Same as the agent's
    /// except left and right are swapped.
    pub fn hostile_index(self) -> u8 {
        match self {
            Octant::Left => 7,
            Octant::Right => 6,
            other => other.player_index(),
        }
    }
}
