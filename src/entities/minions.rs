//! Minion subordination
//!
//! A minion holds a non-owning handle to its master. When the master is gone
//! or dead the minion dies too, reporting back to the master if it still
//! exists.

use hecs::{Entity, World};

use crate::data::{EnemyTemplate, SimConfig};
use crate::ecs::systems::{enter_dead, Actor};
use crate::ecs::{Faction, Name, Position, Vec2, Velocity};
use crate::entities::enemies::behavior_for;
use crate::game::Cooldown;
use crate::world::Ports;

/// Link from a minion to the boss that summoned it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinionBond {
    pub master: Entity,
    /// Optional expiry; the minion self-terminates when it elapses
    pub lifetime: Option<Cooldown>,
}

impl MinionBond {
    pub fn new(master: Entity) -> Self {
        Self { master, lifetime: None }
    }

    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        let mut timer = Cooldown::new(seconds);
        timer.restart();
        self.lifetime = Some(timer);
        self
    }
}

/// Check the master link. Returns true if the minion terminated itself.
pub fn check_bond(actor: &mut Actor, ports: &mut dyn Ports, dt: f32) -> bool {
    let Some(bond) = actor.brain.bond.as_mut() else {
        return false;
    };
    let master = bond.master;
    let expired = bond.lifetime.as_mut().is_some_and(|timer| {
        timer.tick(dt);
        timer.is_ready()
    });

    if !ports.is_alive(master) {
        log::info!("{}: master is dead, dying...", actor.name);
    } else if expired {
        log::info!("{}: lifetime expired", actor.name);
    } else {
        return false;
    }

    let remaining = actor.vitals.current_health();
    if let Err(e) = actor.vitals.take_damage(remaining) {
        log::warn!("{}: {}", actor.name, e);
    }
    enter_dead(actor, ports);
    true
}

/// Spawn a minion bound to `master` from an enemy template
pub fn spawn_minion(
    world: &mut World,
    master: Entity,
    template: &EnemyTemplate,
    config: &SimConfig,
    pos: Vec2,
) -> Entity {
    let vitals = template.stats.vitals(config.difficulty);
    let mut bond = MinionBond::new(master);
    if let Some(seconds) = config.minion_lifetime {
        bond = bond.with_lifetime(seconds);
    }
    let mut brain = template
        .stats
        .brain()
        .with_behavior(behavior_for(&template.archetype, &vitals))
        .with_bond(bond);
    brain.despawn_delay = config.despawn_delay;

    world.spawn((
        Position(pos),
        Velocity::default(),
        Name::new(template.name.clone()),
        Faction::Enemy,
        vitals,
        brain,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{AiState, Brain, Vitals};
    use crate::world::testing::MockPorts;

    fn minion(ports: &mut MockPorts, master: Entity) -> Actor {
        let entity = ports.spawn_npc(Vec2::ZERO);
        let brain = Brain::new(300.0, 40.0, 1.2).with_bond(MinionBond::new(master));
        Actor::new(entity, "Undead Minion", Vec2::ZERO, Vitals::new(20, 5, 100.0), brain)
    }

    #[test]
    fn test_living_master_keeps_minion() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let master = ports.spawn_npc(Vec2::ZERO);
        let mut actor = minion(&mut ports, master);
        assert!(!check_bond(&mut actor, &mut ports, 0.016));
        assert!(actor.vitals.is_alive());
    }

    #[test]
    fn test_dead_master_kills_and_reports() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let master = ports.spawn_npc(Vec2::ZERO);
        let mut actor = minion(&mut ports, master);
        ports.set_alive(master, false);

        assert!(check_bond(&mut actor, &mut ports, 0.016));
        assert_eq!(actor.brain.state, AiState::Dead);
        assert!(!actor.vitals.is_alive());
        assert_eq!(ports.reports, vec![(master, actor.entity)]);
    }

    #[test]
    fn test_vanished_master_skips_report() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let master = ports.spawn_npc(Vec2::ZERO);
        let mut actor = minion(&mut ports, master);
        ports.despawn(master);

        assert!(check_bond(&mut actor, &mut ports, 0.016));
        assert_eq!(actor.brain.state, AiState::Dead);
        assert!(ports.reports.is_empty());
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let master = ports.spawn_npc(Vec2::ZERO);
        let mut actor = minion(&mut ports, master);
        actor.brain.bond = Some(MinionBond::new(master).with_lifetime(1.0));

        assert!(!check_bond(&mut actor, &mut ports, 0.5));
        assert!(check_bond(&mut actor, &mut ports, 0.6));
        assert_eq!(ports.reports.len(), 1);
    }
}
