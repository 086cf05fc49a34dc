//! Tank boss: The Iron Colossus
//!
//! Huge health pool and armour that thickens as the fight goes on. Punishes
//! anyone who stays close with a ground pound.

use crate::combat::{armor_percent, armored_damage, falloff_damage};
use crate::data::TankTuning;
use crate::ecs::systems::{self, halt, taunt, Actor};
use crate::ecs::AiState;
use crate::entities::behavior::BehaviorPolicy;
use crate::game::{Ability, CombatEvent, Cooldown};
use crate::world::Ports;

const PHASE2_POUND_COOLDOWN: f32 = 3.0;
const PHASE2_ATTACK_BONUS: i32 = 5;
const ENRAGE_POUND_BONUS: i32 = 10;
const ENRAGE_POUND_COOLDOWN: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct TankBoss {
    damage_reduction: f32,
    armor_stacks: u32,
    max_armor_stacks: u32,
    pub pound_radius: f32,
    pub pound_damage: i32,
    pound_cooldown: Cooldown,
}

impl TankBoss {
    pub fn new(tuning: &TankTuning) -> Self {
        Self {
            damage_reduction: tuning.damage_reduction,
            armor_stacks: 0,
            max_armor_stacks: tuning.max_armor_stacks,
            pound_radius: tuning.pound_radius,
            pound_damage: tuning.pound_damage,
            pound_cooldown: Cooldown::new(tuning.pound_cooldown),
        }
    }

    pub fn armor_stacks(&self) -> u32 {
        self.armor_stacks
    }

    /// Current damage reduction as whole percent
    pub fn reduction_percent(&self) -> i32 {
        armor_percent(self.damage_reduction, self.armor_stacks)
    }

    pub fn pound_cooldown(&self) -> &Cooldown {
        &self.pound_cooldown
    }

    fn gain_armor_stack(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        if self.armor_stacks >= self.max_armor_stacks {
            return;
        }
        self.armor_stacks += 1;
        log::info!(
            "{} gains armor! Stacks: {}/{}",
            actor.name,
            self.armor_stacks,
            self.max_armor_stacks
        );
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::ArmorStack,
        });
    }

    fn ground_pound(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.pound_cooldown.restart();
        halt(actor, ports);

        log::info!("{} performs GROUND POUND!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::GroundPound,
        });

        for (target, distance) in ports.hostiles_within(actor.position, self.pound_radius) {
            if let Some(damage) = falloff_damage(self.pound_damage, distance, self.pound_radius) {
                log::debug!("Ground Pound hits for {} damage at {:.0}", damage, distance);
                systems::deal_damage(actor, ports, target, damage);
            }
        }
    }
}

impl BehaviorPolicy for TankBoss {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.pound_cooldown.tick(dt);

        systems::run_state_machine(self, actor, ports);

        if actor.brain.state != AiState::Attack || !self.pound_cooldown.is_ready() {
            return;
        }
        let in_range = actor
            .player_target(ports)
            .is_some_and(|target| target.distance <= self.pound_radius);
        if in_range {
            self.ground_pound(actor, ports);
        }
    }

    fn on_phase_change(&mut self, actor: &mut Actor, ports: &mut dyn Ports, phase: u32) {
        if phase != 2 {
            return;
        }
        taunt(actor, ports, "You dare challenge my might? Feel the earth tremble!");
        self.pound_cooldown.set_duration(PHASE2_POUND_COOLDOWN);
        actor.vitals.attack_value += PHASE2_ATTACK_BONUS;
        self.gain_armor_stack(actor, ports);
    }

    fn on_enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        taunt(actor, ports, "ENOUGH! I will crush you all!");
        self.pound_damage += ENRAGE_POUND_BONUS;
        self.pound_cooldown.set_duration(ENRAGE_POUND_COOLDOWN);
        while self.armor_stacks < self.max_armor_stacks {
            self.gain_armor_stack(actor, ports);
        }
    }

    fn modify_incoming(
        &mut self,
        actor: &mut Actor,
        _ports: &mut dyn Ports,
        amount: i32,
    ) -> Option<i32> {
        let reduced = armored_damage(amount, self.reduction_percent());
        if reduced < amount {
            log::debug!("{}'s armor absorbs {} damage!", actor.name, amount - reduced);
        }
        Some(reduced)
    }
}
