//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus the engine-owned
//! resources they need. Long-lived state lives in components or in the
//! engine, never in the systems themselves.

pub mod cleanup;
pub mod combat;
pub mod cutscene;
pub mod hostile_ai;
pub mod player;
pub mod projectiles;
pub mod snapshot;
pub mod vehicles;
pub mod wave_scheduler;
