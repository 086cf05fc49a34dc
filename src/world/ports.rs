//! Collaborator contracts
//!
//! The AI core reads the world and acts on it only through these traits.
//! The simulation host implements them over its entity arena; tests can
//! implement them over anything.

use hecs::Entity;
use rand::RngCore;

use crate::ecs::Vec2;
use crate::game::CombatEvent;

/// Read-only queries about other entities
pub trait WorldQuery {
    fn find_player(&self) -> Option<Entity>;

    /// Whether the handle still refers to a live slot in the arena
    fn is_valid(&self, entity: Entity) -> bool;

    /// Valid and above zero health
    fn is_alive(&self, entity: Entity) -> bool;

    fn position(&self, entity: Entity) -> Option<Vec2>;

    fn health_fraction(&self, entity: Entity) -> Option<f32>;

    /// Living player-side combatants within `radius` of `center`, with their distance
    fn hostiles_within(&self, center: Vec2, radius: f32) -> Vec<(Entity, f32)>;

    fn is_player_alive(&self) -> bool {
        self.find_player().is_some_and(|player| self.is_alive(player))
    }

    fn distance(&self, a: Entity, b: Entity) -> Option<f32> {
        Some(self.position(a)?.distance(self.position(b)?))
    }

    fn direction_to(&self, a: Entity, b: Entity) -> Option<Vec2> {
        Some(self.position(a)?.direction_to(self.position(b)?))
    }
}

/// Movement executor
pub trait Movement {
    /// Set the desired velocity for this tick; integration happens externally
    fn move_entity(&mut self, entity: Entity, velocity: Vec2);

    /// Instantly relocate an entity (teleports)
    fn place_entity(&mut self, entity: Entity, position: Vec2);
}

/// Damage and heal sink
pub trait DamageSink {
    /// Returns the damage actually applied
    fn apply_damage_to_player(&mut self, source: Entity, amount: i32) -> i32;

    /// Route damage through the target's full receive-damage path
    fn apply_damage_to_entity(&mut self, source: Entity, target: Entity, amount: i32) -> i32;
}

/// Minion spawn service
pub trait SpawnService {
    /// Spawn a minion bound to `master` at `offset` from the master
    fn spawn_minion(&mut self, master: Entity, offset: Vec2) -> Option<Entity>;

    /// Death-accounting callback into the master; skipped if the master is gone
    fn report_minion_death(&mut self, master: Entity, minion: Entity);
}

/// Notification sink for HUD, audio and logs
pub trait NotificationSink {
    fn notify(&mut self, event: CombatEvent);
}

/// Everything an AI update may touch, plus the simulation's random source
pub trait Ports: WorldQuery + Movement + DamageSink + SpawnService + NotificationSink {
    fn rng(&mut self) -> &mut dyn RngCore;
}
