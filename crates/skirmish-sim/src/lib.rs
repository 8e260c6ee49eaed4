//! Simulation engine for the arena skirmish.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the host.

pub mod collision;
pub mod encounter;
pub mod engine;
pub mod hooks;
pub mod level;
pub mod physics;
pub mod projectile;
pub mod systems;
pub mod world_setup;

pub use skirmish_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
