//! Headless host for the skirmish simulation: a threaded game loop and a
//! scripted input driver for unattended runs.

pub mod autopilot;
pub mod game_loop;
