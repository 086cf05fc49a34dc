//! World module
//!
//! Contains the collaborator interfaces the AI core is written against.

pub mod ports;
#[cfg(test)]
pub(crate) mod testing;

pub use ports::{DamageSink, Movement, NotificationSink, Ports, SpawnService, WorldQuery};
