//! Game module - simulation host, timers and event plumbing

pub mod events;
mod state;
mod time;

pub use events::{Ability, CombatEvent, EventListener, EventRecord, SharedEventLog};
pub use state::Simulation;
pub use time::{Cooldown, Interval};
