//! Behavior policies
//!
//! Every AI entity carries one `Behavior`. The shared systems dispatch to it
//! through `BehaviorPolicy` at the points where archetypes differ: the
//! per-tick state handling, the basic strike, phase and enrage hooks, and
//! the incoming-damage pipeline.

use hecs::Entity;

use crate::ecs::systems::{self, Actor};
use crate::world::Ports;

use super::bosses::{BerserkerBoss, NecromancerBoss, RangedBoss, SpeedBoss, TankBoss};
use super::enemies::{BruteEnemy, CowardEnemy, FrenzyEnemy, MarksmanEnemy, StalkerEnemy};

/// Capability interface implemented by every behavior
pub trait BehaviorPolicy {
    /// Called once right after the entity enters the world
    fn on_spawn(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports) {}

    /// Per-tick state handling and ability triggers
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _dt: f32) {
        systems::run_state_machine(self, actor, ports);
    }

    /// Basic attack against `target`, invoked by the Attack state when the
    /// attack cooldown is ready
    fn strike(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Entity) {
        systems::basic_attack(actor, ports, target);
    }

    fn on_phase_change(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports, _phase: u32) {}

    fn on_enrage(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports) {}

    /// Adjust a raw hit before it is applied. `None` avoids it entirely.
    fn modify_incoming(
        &mut self,
        _actor: &mut Actor,
        _ports: &mut dyn Ports,
        amount: i32,
    ) -> Option<i32> {
        Some(amount)
    }

    /// After a non-lethal hit landed
    fn on_damage_taken(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports, _amount: i32) {}

    fn on_death(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports) {}

    /// Death-accounting callback from one of this entity's minions
    fn on_minion_death(&mut self, _actor: &mut Actor, _ports: &mut dyn Ports, _minion: Entity) {}
}

/// Plain enemy: the shared state machine with no extras
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenericEnemy;

impl BehaviorPolicy for GenericEnemy {}

/// Tagged behavior carried by each AI entity
#[derive(Debug, Clone)]
pub enum Behavior {
    Generic(GenericEnemy),
    Coward(CowardEnemy),
    Brute(BruteEnemy),
    Marksman(MarksmanEnemy),
    Stalker(StalkerEnemy),
    Frenzy(FrenzyEnemy),
    Tank(TankBoss),
    Speed(SpeedBoss),
    Ranged(RangedBoss),
    Berserker(BerserkerBoss),
    Necromancer(NecromancerBoss),
}

impl Behavior {
    pub fn policy_mut(&mut self) -> &mut dyn BehaviorPolicy {
        match self {
            Behavior::Generic(policy) => policy,
            Behavior::Coward(policy) => policy,
            Behavior::Brute(policy) => policy,
            Behavior::Marksman(policy) => policy,
            Behavior::Stalker(policy) => policy,
            Behavior::Frenzy(policy) => policy,
            Behavior::Tank(policy) => policy,
            Behavior::Speed(policy) => policy,
            Behavior::Ranged(policy) => policy,
            Behavior::Berserker(policy) => policy,
            Behavior::Necromancer(policy) => policy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Generic(_) => "generic",
            Behavior::Coward(_) => "coward",
            Behavior::Brute(_) => "brute",
            Behavior::Marksman(_) => "marksman",
            Behavior::Stalker(_) => "stalker",
            Behavior::Frenzy(_) => "frenzy",
            Behavior::Tank(_) => "tank",
            Behavior::Speed(_) => "speed",
            Behavior::Ranged(_) => "ranged",
            Behavior::Berserker(_) => "berserker",
            Behavior::Necromancer(_) => "necromancer",
        }
    }

    pub fn as_tank(&self) -> Option<&TankBoss> {
        match self {
            Behavior::Tank(tank) => Some(tank),
            _ => None,
        }
    }

    pub fn as_speed(&self) -> Option<&SpeedBoss> {
        match self {
            Behavior::Speed(speed) => Some(speed),
            _ => None,
        }
    }

    pub fn as_ranged(&self) -> Option<&RangedBoss> {
        match self {
            Behavior::Ranged(ranged) => Some(ranged),
            _ => None,
        }
    }

    pub fn as_berserker(&self) -> Option<&BerserkerBoss> {
        match self {
            Behavior::Berserker(berserker) => Some(berserker),
            _ => None,
        }
    }

    pub fn as_necromancer(&self) -> Option<&NecromancerBoss> {
        match self {
            Behavior::Necromancer(necromancer) => Some(necromancer),
            _ => None,
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior::Generic(GenericEnemy)
    }
}

/// Detach the actor's behavior so it can mutate the actor that owns it
pub fn with_policy<R>(
    actor: &mut Actor,
    ports: &mut dyn Ports,
    f: impl FnOnce(&mut dyn BehaviorPolicy, &mut Actor, &mut dyn Ports) -> R,
) -> R {
    let mut behavior = std::mem::take(&mut actor.brain.behavior);
    let result = f(behavior.policy_mut(), actor, ports);
    actor.brain.behavior = behavior;
    result
}
