//! Hostile AI for the skirmish simulation.
//!
//! Pure, ECS-free functions: the hostile behavior state machine, steering
//! vectors, perception helpers and tuning profiles. Callers gather the
//! situation into plain data and apply the results themselves.

pub mod fsm;
pub mod perception;
pub mod profiles;
pub mod steering;

pub use skirmish_core as core;
