//! No Heroes - enemy and boss AI core
//!
//! Engine-agnostic combat AI for a real-time action RPG: a shared enemy
//! state machine, five boss archetypes with phases and enrage, and minion
//! subordination, driven one frame at a time by `Simulation`.

pub mod game;
pub mod ecs;
pub mod world;
pub mod entities;
pub mod combat;
pub mod progression;
pub mod data;

// Re-export commonly used types
pub use combat::CombatError;
pub use data::DataManager;
pub use ecs::components::*;
pub use entities::BossKind;
pub use game::{CombatEvent, Simulation};
pub use progression::Difficulty;
