//! Necromancer boss: The Undying Archlich
//!
//! Fights through a roster of undead minions. Each living minion shields the
//! boss, each fallen one feeds it, and it drains life from anyone who stands
//! too close. On death it releases a nova.

use hecs::Entity;
use rand::Rng;

use crate::combat::{falloff_damage, minion_shield_percent, reduce_by_percent};
use crate::data::NecromancerTuning;
use crate::ecs::systems::{
    self, halt, heal_self, steer, taunt, transition, Actor, Target, ATTACK_LEASH_FACTOR,
    LOSE_TARGET_FACTOR,
};
use crate::ecs::{AiState, Vec2};
use crate::entities::behavior::BehaviorPolicy;
use crate::game::{Ability, CombatEvent, Cooldown, Interval};
use crate::world::Ports;

/// Chase approaches at this fraction of move speed
const APPROACH_SPEED_FACTOR: f32 = 0.7;
const MINION_DEATH_ATTACK_BONUS: i32 = 2;
const MINION_DEATH_DRAIN_BONUS: i32 = 1;

#[derive(Debug, Clone)]
pub struct NecromancerBoss {
    minions: Vec<Entity>,
    pub max_minions: usize,
    initial_minions: u32,
    summon_cooldown: Cooldown,
    summon_spread: f32,
    pub drain_range: f32,
    pub drain_damage: i32,
    drain_tick: Interval,
    draining: bool,
    curse_cooldown: Cooldown,
    curse_damage: i32,
    resurrect_enabled: bool,
    resurrect_cooldown: Cooldown,
    resurrect_batch: u32,
    resurrect_credits: u32,
    nova_radius: f32,
    nova_damage: i32,
}

impl NecromancerBoss {
    pub fn new(tuning: &NecromancerTuning) -> Self {
        Self {
            minions: Vec::new(),
            max_minions: tuning.max_minions,
            initial_minions: tuning.initial_minions,
            summon_cooldown: Cooldown::new(tuning.summon_cooldown),
            summon_spread: tuning.summon_spread,
            drain_range: tuning.drain_range,
            drain_damage: tuning.drain_damage,
            drain_tick: Interval::new(tuning.drain_interval),
            draining: false,
            curse_cooldown: Cooldown::new(tuning.curse_cooldown),
            curse_damage: tuning.curse_damage,
            resurrect_enabled: false,
            resurrect_cooldown: Cooldown::new(tuning.resurrect_cooldown),
            resurrect_batch: tuning.resurrect_batch,
            resurrect_credits: 0,
            nova_radius: tuning.nova_radius,
            nova_damage: tuning.nova_damage,
        }
    }

    /// Minions currently on the roster
    pub fn minions(&self) -> &[Entity] {
        &self.minions
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub fn resurrect_enabled(&self) -> bool {
        self.resurrect_enabled
    }

    /// Pending resurrections earned from fallen minions
    pub fn resurrect_credits(&self) -> u32 {
        self.resurrect_credits
    }

    pub fn summon_cooldown(&self) -> &Cooldown {
        &self.summon_cooldown
    }

    /// Current damage reduction from the minion shield, as whole percent
    pub fn shield_percent(&self) -> i32 {
        minion_shield_percent(self.minions.len())
    }

    fn prune_minions(&mut self, ports: &dyn Ports) {
        self.minions.retain(|&minion| ports.is_alive(minion));
    }

    /// Summon one minion. Returns false at the roster cap or if spawning failed.
    fn summon(&mut self, actor: &Actor, ports: &mut dyn Ports) -> bool {
        if self.minions.len() >= self.max_minions {
            return false;
        }
        self.summon_cooldown.restart();

        let spread = self.summon_spread.abs();
        let rng = ports.rng();
        let offset = Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread));
        let Some(minion) = ports.spawn_minion(actor.entity, offset) else {
            log::warn!("{} failed to summon a minion", actor.name);
            return false;
        };

        self.minions.push(minion);
        log::debug!(
            "{} summons a minion ({}/{})",
            actor.name,
            self.minions.len(),
            self.max_minions
        );
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Summon,
        });
        true
    }

    fn summon_many(&mut self, actor: &Actor, ports: &mut dyn Ports, count: u32) -> u32 {
        let mut summoned = 0;
        for _ in 0..count {
            if !self.summon(actor, ports) {
                break;
            }
            summoned += 1;
        }
        summoned
    }

    fn curse(&mut self, actor: &Actor, ports: &mut dyn Ports, target: Target) {
        self.curse_cooldown.restart();
        log::info!("{} casts CURSE!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Curse,
        });
        systems::deal_damage(actor, ports, target.entity, self.curse_damage);
    }

    fn resurrect(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.resurrect_cooldown.restart();
        let batch = self.resurrect_credits.min(self.resurrect_batch);
        log::info!("{} raises the fallen!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Resurrect,
        });
        let raised = self.summon_many(actor, ports, batch);
        self.resurrect_credits -= raised;
    }

    fn drain(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Target) {
        let dealt = systems::deal_damage(actor, ports, target.entity, self.drain_damage);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::LifeDrain,
        });
        if dealt > 0 {
            log::debug!("{} drains {} life", actor.name, dealt);
            heal_self(actor, ports, dealt);
        }
    }

    fn update_chase(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        self.draining = false;
        let Some(target) = actor.player_target(ports) else {
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
            return;
        };

        if target.distance > actor.brain.detection_range * LOSE_TARGET_FACTOR {
            log::info!("{} lost sight of player", actor.name);
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
        } else if target.distance < self.drain_range {
            let away = target.position.direction_to(actor.position);
            steer(actor, ports, away, actor.vitals.move_speed);
        } else if target.distance > actor.brain.attack_range {
            let toward = actor.position.direction_to(target.position);
            steer(actor, ports, toward, actor.vitals.move_speed * APPROACH_SPEED_FACTOR);
        } else {
            halt(actor, ports);
            transition(actor, ports, AiState::Attack);
        }
    }

    fn update_attack(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        let Some(target) = actor.player_target(ports) else {
            self.draining = false;
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
            return;
        };

        halt(actor, ports);
        let draining = target.distance <= self.drain_range;
        if draining != self.draining {
            self.draining = draining;
            self.drain_tick.reset();
        }

        if target.distance > actor.brain.attack_range * ATTACK_LEASH_FACTOR {
            self.draining = false;
            transition(actor, ports, AiState::Chase);
        }
    }

    /// Roster upkeep runs whether or not anyone is around to fight
    fn raise_servants(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        if self.summon_cooldown.is_ready() && self.minions.len() < self.max_minions {
            self.summon(actor, ports);
        }

        if self.resurrect_enabled
            && self.resurrect_cooldown.is_ready()
            && self.resurrect_credits > 0
        {
            self.resurrect(actor, ports);
        }
    }

    fn use_combat_abilities(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        let Some(target) = actor.player_target(ports) else {
            self.draining = false;
            return;
        };

        if self.curse_cooldown.is_ready() && target.distance <= actor.brain.attack_range {
            self.curse(actor, ports, target);
        }

        if self.draining && self.drain_tick.update(dt) && target.distance <= self.drain_range {
            self.drain(actor, ports, target);
        }
    }
}

impl BehaviorPolicy for NecromancerBoss {
    fn on_spawn(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        let summoned = self.summon_many(actor, ports, self.initial_minions);
        log::info!("{} rises with {} servants", actor.name, summoned);
    }

    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.summon_cooldown.tick(dt);
        self.curse_cooldown.tick(dt);
        self.resurrect_cooldown.tick(dt);
        self.prune_minions(ports);

        match actor.brain.state {
            AiState::Idle => systems::update_idle(actor, ports),
            AiState::Patrol => systems::update_patrol(actor, ports),
            AiState::Chase => self.update_chase(actor, ports),
            AiState::Attack => self.update_attack(actor, ports),
            AiState::Dead => return,
        }

        self.raise_servants(actor, ports);
        if matches!(actor.brain.state, AiState::Chase | AiState::Attack) {
            self.use_combat_abilities(actor, ports, dt);
        } else {
            self.draining = false;
        }
    }

    fn on_phase_change(&mut self, actor: &mut Actor, ports: &mut dyn Ports, phase: u32) {
        match phase {
            2 => {
                taunt(actor, ports, "Rise, my servants! Consume the living!");
                self.max_minions = 7;
                self.summon_cooldown.set_duration(5.0);
                self.drain_damage = self.drain_damage.max(7);
                self.summon_many(actor, ports, 2);
            }
            3 => {
                taunt(actor, ports, "You cannot kill what is already dead!");
                self.max_minions = 10;
                self.summon_cooldown.set_duration(4.0);
                self.drain_damage = self.drain_damage.max(10);
                self.drain_range = 200.0;
                self.resurrect_enabled = true;
            }
            _ => {}
        }
    }

    fn on_enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        taunt(actor, ports, "I am eternal! Death is my domain!");
        self.max_minions = 15;
        self.summon_cooldown.set_duration(3.0);
        self.drain_damage = self.drain_damage.max(15);
        self.drain_tick.set_period(0.5);
        self.summon_many(actor, ports, 5);
    }

    fn modify_incoming(
        &mut self,
        actor: &mut Actor,
        ports: &mut dyn Ports,
        amount: i32,
    ) -> Option<i32> {
        self.prune_minions(ports);
        let percent = self.shield_percent();
        if percent > 0 {
            log::debug!("{}'s minions shield {}% of the blow", actor.name, percent);
        }
        Some(reduce_by_percent(amount, percent))
    }

    fn on_death(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        self.draining = false;
        log::info!("{} releases a DEATH NOVA!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::DeathNova,
        });
        for (target, distance) in ports.hostiles_within(actor.position, self.nova_radius) {
            if let Some(damage) = falloff_damage(self.nova_damage, distance, self.nova_radius) {
                systems::deal_damage(actor, ports, target, damage);
            }
        }
    }

    fn on_minion_death(&mut self, actor: &mut Actor, _ports: &mut dyn Ports, minion: Entity) {
        if !actor.vitals.is_alive() {
            return;
        }
        self.minions.retain(|&m| m != minion);
        self.resurrect_credits += 1;
        actor.vitals.attack_value += MINION_DEATH_ATTACK_BONUS;
        self.drain_damage += MINION_DEATH_DRAIN_BONUS;
        log::debug!(
            "{} feeds on a fallen servant (ATK {}, drain {})",
            actor.name,
            actor.vitals.attack_value,
            self.drain_damage
        );
    }
}
