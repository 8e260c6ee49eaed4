//! Scripted input for unattended runs: walks into the cutscene zone, clicks
//! through dialog, and shoots the nearest hostile.

use glam::Vec2;

use skirmish_core::commands::PlayerCommand;
use skirmish_core::enums::{GamePhase, HostileState, PlayerState, WeaponMode};
use skirmish_core::state::GameStateSnapshot;

/// Frames between dialog advances.
const DIALOG_PACE: u32 = 45;
/// Hostiles closer than this are engaged.
const ENGAGE_RANGE: f32 = 500.0;
/// Distance from the zone centre that counts as arrived.
const ZONE_ARRIVAL: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    zone_center: Vec2,
    dialog_wait: u32,
    restarts_left: u32,
}

impl Autopilot {
    pub fn new(zone_center: Vec2, max_restarts: u32) -> Self {
        Self {
            zone_center,
            dialog_wait: DIALOG_PACE,
            restarts_left: max_restarts,
        }
    }

    /// Commands to send in response to the latest snapshot.
    pub fn decide(&mut self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        match snap.phase {
            GamePhase::Ready => vec![PlayerCommand::StartMission],
            GamePhase::Exploring => self.explore(snap),
            GamePhase::CutsceneStart | GamePhase::CutsceneEnd => self.talk(snap),
            GamePhase::Combat => self.fight(snap),
            GamePhase::GameOver if self.restarts_left > 0 => {
                self.restarts_left -= 1;
                vec![PlayerCommand::RestartMission]
            }
            GamePhase::GameOver | GamePhase::MissionComplete => Vec::new(),
        }
    }

    fn explore(&self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        let Some(player) = &snap.player else {
            return Vec::new();
        };
        let offset = self.zone_center - player.position;
        let dir = if offset.length() > ZONE_ARRIVAL {
            offset.normalize_or_zero()
        } else {
            Vec2::ZERO
        };
        vec![PlayerCommand::Move { x: dir.x, y: dir.y }]
    }

    fn talk(&mut self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        let talking = snap.cutscene.as_ref().is_some_and(|c| c.line.is_some());
        if !talking {
            self.dialog_wait = DIALOG_PACE;
            return Vec::new();
        }
        if self.dialog_wait > 0 {
            self.dialog_wait -= 1;
            return Vec::new();
        }
        self.dialog_wait = DIALOG_PACE;
        vec![PlayerCommand::AdvanceDialog]
    }

    fn fight(&self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        let Some(player) = &snap.player else {
            return Vec::new();
        };
        let target = snap
            .hostiles
            .iter()
            .filter(|h| h.state != HostileState::Death)
            .map(|h| (h.position.distance(player.position), h.position))
            .filter(|(d, _)| *d < ENGAGE_RANGE)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let mut commands = Vec::new();
        match target {
            Some((_, position)) => {
                if player.weapon != WeaponMode::Ranged {
                    commands.push(PlayerCommand::SwitchWeapon {
                        weapon: WeaponMode::Ranged,
                    });
                }
                let aim = (position - player.position).normalize_or_zero();
                commands.push(PlayerCommand::Move { x: aim.x, y: aim.y });
                if player.state != PlayerState::Shooting {
                    commands.push(PlayerCommand::AttackPressed);
                }
            }
            None => {
                if player.state == PlayerState::Shooting {
                    commands.push(PlayerCommand::AttackReleased);
                }
                commands.push(PlayerCommand::Move { x: 0.0, y: 0.0 });
            }
        }
        commands
    }
}
