//! Timed, single-shot encounter stages.
//!
//! An `EncounterSequence` is an ordered list of steps attached to one
//! transient actor. `advance` consumes simulation time, runs every step that
//! has become due, and reports the resulting actions for the caller to
//! apply. Leftover time from a finished wait carries into the next step, so
//! the schedule does not drift with the tick rate. Once the last step has
//! run the sequence is finished and further calls do nothing.

use glam::Vec2;

use skirmish_core::constants::{VEHICLE_ARRIVAL_SECS, VEHICLE_LINGER_SECS, VEHICLE_SETTLE_SECS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncounterStep {
    ActivateCollision,
    /// Start a linear move. Does not block the next step.
    MoveTo { target: Vec2, duration_secs: f32 },
    Wait { secs: f32 },
    OpenDoors,
    DeactivateCollision,
    SpawnHostiles { count: u32 },
    Deregister,
}

/// What the owner of the sequence must do now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncounterAction {
    ActivateCollision,
    BeginMove { target: Vec2, duration_secs: f32 },
    OpenDoors,
    DeactivateCollision,
    SpawnHostiles { count: u32 },
    Deregister,
}

#[derive(Debug, Clone)]
pub struct EncounterSequence {
    steps: Vec<EncounterStep>,
    cursor: usize,
    waited_secs: f32,
}

impl EncounterSequence {
    pub fn new(steps: Vec<EncounterStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            waited_secs: 0.0,
        }
    }

    /// Vehicle arrival: drive in, open up, drop off `count` hostiles, leave.
    pub fn vehicle_arrival(target: Vec2, count: u32) -> Self {
        Self::new(vec![
            EncounterStep::ActivateCollision,
            EncounterStep::MoveTo {
                target,
                duration_secs: VEHICLE_ARRIVAL_SECS,
            },
            EncounterStep::Wait {
                secs: VEHICLE_ARRIVAL_SECS + VEHICLE_SETTLE_SECS,
            },
            EncounterStep::OpenDoors,
            EncounterStep::DeactivateCollision,
            EncounterStep::SpawnHostiles { count },
            EncounterStep::Wait {
                secs: VEHICLE_LINGER_SECS,
            },
            EncounterStep::Deregister,
        ])
    }

    /// Run every step due within `dt`, appending actions to `out`.
    pub fn advance(&mut self, dt: f32, out: &mut Vec<EncounterAction>) {
        let mut budget = dt;
        while let Some(step) = self.steps.get(self.cursor).copied() {
            let action = match step {
                EncounterStep::Wait { secs } => {
                    let remaining = secs - self.waited_secs;
                    if budget < remaining {
                        self.waited_secs += budget;
                        return;
                    }
                    budget -= remaining;
                    self.waited_secs = 0.0;
                    None
                }
                EncounterStep::ActivateCollision => Some(EncounterAction::ActivateCollision),
                EncounterStep::MoveTo {
                    target,
                    duration_secs,
                } => Some(EncounterAction::BeginMove {
                    target,
                    duration_secs,
                }),
                EncounterStep::OpenDoors => Some(EncounterAction::OpenDoors),
                EncounterStep::DeactivateCollision => Some(EncounterAction::DeactivateCollision),
                EncounterStep::SpawnHostiles { count } => {
                    Some(EncounterAction::SpawnHostiles { count })
                }
                EncounterStep::Deregister => Some(EncounterAction::Deregister),
            };
            out.extend(action);
            self.cursor += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}
