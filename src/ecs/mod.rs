//! Entity Component System module
//!
//! Components carried by combatants and the systems that drive them.

pub mod components;
pub mod systems;

pub use components::*;
pub use systems::{update_actor, Actor, Target};
