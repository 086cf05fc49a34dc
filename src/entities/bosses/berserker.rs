//! Berserker boss: The Blood Reaver
//!
//! Gets stronger the more it bleeds. Rage from missing health and from each
//! hit taken scales attack and speed; lifesteal and whirlwinds keep it in the
//! fight, and below a health threshold it commits to execute mode.

use hecs::Entity;

use crate::data::BerserkerTuning;
use crate::ecs::systems::{self, halt, heal_self, steer, taunt, Actor};
use crate::ecs::AiState;
use crate::entities::behavior::BehaviorPolicy;
use crate::game::{Ability, CombatEvent, Cooldown, Interval};
use crate::world::Ports;

const EXECUTE_ATTACK_BONUS: i32 = 15;
const EXECUTE_SPEED_MULT: f32 = 1.5;
const EXECUTE_LIFESTEAL: f32 = 0.5;
const EXECUTE_WHIRLWIND_DURATION: f32 = 5.0;
/// Targets below this health fraction take the execute bonus
const EXECUTE_TARGET_FRACTION: f32 = 0.3;
const WHIRLWIND_SPEED_MULT: f32 = 1.2;
const ENRAGE_BONUS_RAGE: f32 = 1.0;
const ENRAGE_LIFESTEAL: f32 = 0.4;
const ENRAGE_WHIRLWIND_COOLDOWN: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Whirlwind {
    remaining: f32,
    pulse: Interval,
}

#[derive(Debug, Clone)]
pub struct BerserkerBoss {
    base_attack: i32,
    base_speed: f32,
    /// Rage from missing health, recomputed every tick
    rage: f32,
    /// Rage accumulated from hits taken and enrage
    bonus_rage: f32,
    rage_per_hit: f32,
    lifesteal: f32,
    cleave_radius: f32,
    whirlwind: Option<Whirlwind>,
    whirlwind_cooldown: Cooldown,
    whirlwind_duration: f32,
    whirlwind_trigger: f32,
    whirlwind_pulse: f32,
    execute_threshold: f32,
    execute_mode: bool,
    blood_trail: Option<Interval>,
    blood_trail_interval: f32,
    drew_first_blood: bool,
}

impl BerserkerBoss {
    pub fn new(tuning: &BerserkerTuning, base_attack: i32, base_speed: f32) -> Self {
        Self {
            base_attack,
            base_speed,
            rage: 0.0,
            bonus_rage: 0.0,
            rage_per_hit: tuning.rage_per_hit,
            lifesteal: tuning.lifesteal,
            cleave_radius: tuning.cleave_radius,
            whirlwind: None,
            whirlwind_cooldown: Cooldown::new(tuning.whirlwind_cooldown),
            whirlwind_duration: tuning.whirlwind_duration,
            whirlwind_trigger: tuning.whirlwind_trigger,
            whirlwind_pulse: tuning.whirlwind_pulse,
            execute_threshold: tuning.execute_threshold,
            execute_mode: false,
            blood_trail: None,
            blood_trail_interval: tuning.blood_trail_interval,
            drew_first_blood: false,
        }
    }

    pub fn base_attack(&self) -> i32 {
        self.base_attack
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Total rage multiplier currently applied
    pub fn rage(&self) -> f32 {
        self.rage + self.bonus_rage
    }

    pub fn lifesteal(&self) -> f32 {
        self.lifesteal
    }

    pub fn is_whirlwinding(&self) -> bool {
        self.whirlwind.is_some()
    }

    pub fn whirlwind_cooldown(&self) -> &Cooldown {
        &self.whirlwind_cooldown
    }

    pub fn in_execute_mode(&self) -> bool {
        self.execute_mode
    }

    pub fn has_blood_trail(&self) -> bool {
        self.blood_trail.is_some()
    }

    /// Recompute attack and speed from the rage curve
    fn apply_rage(&mut self, actor: &mut Actor) {
        let missing = 1.0 - actor.vitals.health_fraction();
        self.rage = missing * missing * 2.0;
        let rage = self.rage();

        let mut attack = (self.base_attack as f32 * (1.0 + rage)) as i32;
        let mut speed = self.base_speed * (1.0 + rage * 0.5);
        if self.execute_mode {
            attack += EXECUTE_ATTACK_BONUS;
            speed *= EXECUTE_SPEED_MULT;
        }
        actor.vitals.attack_value = attack;
        actor.vitals.move_speed = speed;
    }

    fn raise_lifesteal(&mut self, lifesteal: f32) {
        self.lifesteal = self.lifesteal.max(lifesteal);
    }

    fn shorten_whirlwind_cooldown(&mut self, seconds: f32) {
        let current = self.whirlwind_cooldown.duration();
        self.whirlwind_cooldown.set_duration(current.min(seconds));
    }

    fn enable_blood_trail(&mut self) {
        if self.blood_trail.is_none() {
            self.blood_trail = Some(Interval::new(self.blood_trail_interval));
        }
    }

    fn enter_execute_mode(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.execute_mode = true;
        self.raise_lifesteal(EXECUTE_LIFESTEAL);
        self.whirlwind_duration = EXECUTE_WHIRLWIND_DURATION;
        log::info!("{} enters EXECUTE MODE!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::ExecuteMode,
        });
    }

    fn drink(&self, actor: &mut Actor, ports: &mut dyn Ports, dealt: i32) {
        let heal = (dealt as f32 * self.lifesteal) as i32;
        if heal > 0 {
            log::debug!("{} drinks {} health", actor.name, heal);
            heal_self(actor, ports, heal);
        }
    }

    fn start_whirlwind(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.whirlwind_cooldown.restart();
        self.whirlwind = Some(Whirlwind {
            remaining: self.whirlwind_duration,
            pulse: Interval::new(self.whirlwind_pulse),
        });
        log::info!("{} begins WHIRLWIND!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Whirlwind,
        });
    }

    fn process_whirlwind(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        let Some(mut whirlwind) = self.whirlwind else {
            return;
        };
        whirlwind.remaining -= dt;

        match actor.player_target(ports) {
            Some(target) => {
                let toward = actor.position.direction_to(target.position);
                steer(actor, ports, toward, actor.vitals.move_speed * WHIRLWIND_SPEED_MULT);
            }
            None => halt(actor, ports),
        }

        if whirlwind.pulse.update(dt) {
            let damage = actor.vitals.attack_value / 3;
            let mut dealt = 0;
            for (target, _) in ports.hostiles_within(actor.position, self.cleave_radius) {
                dealt += systems::deal_damage(actor, ports, target, damage);
            }
            self.drink(actor, ports, dealt);
        }

        if whirlwind.remaining <= 0.0 {
            log::debug!("{}'s whirlwind ends", actor.name);
            self.whirlwind = None;
            halt(actor, ports);
        } else {
            self.whirlwind = Some(whirlwind);
        }
    }
}

impl BehaviorPolicy for BerserkerBoss {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.whirlwind_cooldown.tick(dt);

        if !self.execute_mode && actor.vitals.health_fraction() <= self.execute_threshold {
            self.enter_execute_mode(actor, ports);
        }
        self.apply_rage(actor);

        if let Some(trail) = self.blood_trail.as_mut() {
            if trail.update(dt) {
                ports.notify(CombatEvent::AbilityUsed {
                    entity: actor.entity,
                    ability: Ability::BloodTrail,
                });
            }
        }

        if self.is_whirlwinding() {
            self.process_whirlwind(actor, ports, dt);
            return;
        }

        systems::run_state_machine(self, actor, ports);

        if !matches!(actor.brain.state, AiState::Chase | AiState::Attack)
            || !self.whirlwind_cooldown.is_ready()
        {
            return;
        }
        let close = actor
            .player_target(ports)
            .is_some_and(|target| target.distance < self.whirlwind_trigger);
        if close || (self.execute_mode && actor.player_target(ports).is_some()) {
            self.start_whirlwind(actor, ports);
        }
    }

    fn strike(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Entity) {
        let executes = self.execute_mode
            && ports
                .health_fraction(target)
                .is_some_and(|fraction| fraction < EXECUTE_TARGET_FRACTION);

        let mut dealt = systems::basic_attack(actor, ports, target);
        if !self.drew_first_blood && dealt > 0 {
            self.drew_first_blood = true;
            taunt(actor, ports, "First blood!");
        }

        if executes {
            let bonus = actor.vitals.attack_value / 2;
            log::info!("{} EXECUTES for {} bonus damage!", actor.name, bonus);
            dealt += systems::deal_damage(actor, ports, target, bonus);
        }

        for (other, _) in ports.hostiles_within(actor.position, self.cleave_radius) {
            if other != target {
                dealt += systems::deal_damage(actor, ports, other, actor.vitals.attack_value);
            }
        }

        self.drink(actor, ports, dealt);
    }

    fn on_phase_change(&mut self, actor: &mut Actor, ports: &mut dyn Ports, phase: u32) {
        match phase {
            2 => {
                taunt(actor, ports, "BLOOD FOR BLOOD!");
                self.raise_lifesteal(0.20);
                self.shorten_whirlwind_cooldown(7.0);
            }
            3 => {
                taunt(actor, ports, "I WILL FEAST ON YOUR BONES!");
                self.raise_lifesteal(0.25);
                self.shorten_whirlwind_cooldown(6.0);
                self.enable_blood_trail();
            }
            4 => {
                taunt(actor, ports, "NOTHING CAN STOP ME NOW!");
                self.raise_lifesteal(0.30);
                self.shorten_whirlwind_cooldown(5.0);
            }
            _ => {}
        }
    }

    fn on_enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        taunt(actor, ports, "RAAAAAAAGH! I AM UNSTOPPABLE!");
        // Fold the shared enrage bonus into the base so the rage curve keeps it
        self.base_attack = (self.base_attack as f32 * systems::ENRAGE_ATTACK_MULT) as i32;
        self.base_speed *= systems::ENRAGE_SPEED_MULT;
        self.bonus_rage += ENRAGE_BONUS_RAGE;
        self.raise_lifesteal(ENRAGE_LIFESTEAL);
        self.shorten_whirlwind_cooldown(ENRAGE_WHIRLWIND_COOLDOWN);
        self.enable_blood_trail();
        self.apply_rage(actor);
        self.start_whirlwind(actor, ports);
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, _ports: &mut dyn Ports, _amount: i32) {
        self.bonus_rage += self.rage_per_hit;
        log::debug!("{}'s rage grows to {:.2}", actor.name, self.rage());
    }
}
